//! `{table}-{op}/{table}-{op}.component.html`

use crate::codegen::model::{ColumnModel, TableModel};
use crate::codegen::naming::ComponentKind;
use crate::codegen::type_resolver::HtmlInputType;
use crate::codegen::writer::CodeWriter;

/// Render the template of a component
pub fn render_component_html(model: &TableModel, kind: ComponentKind) -> String {
    let mut w = CodeWriter::typescript();
    match kind {
        ComponentKind::Insert => write_insert(&mut w, model),
        ComponentKind::Update => write_update(&mut w, model),
        ComponentKind::Delete => write_delete(&mut w, model),
        ComponentKind::Get => write_get(&mut w, model),
    }
    w.build()
}

fn write_input(w: &mut CodeWriter, model: &TableModel, col: &ColumnModel, readonly: bool) {
    // a required checkbox could never be submitted unchecked
    let required = col.html_input != HtmlInputType::Checkbox;
    let mut attrs = String::new();
    if required {
        attrs.push_str(" required");
    }
    if readonly {
        attrs.push_str(" readonly");
    }

    w.line("<div>");
    w.indent();
    w.line(format!("<label for=\"{}\">{}:</label>", col.name, col.label));
    w.line(format!(
        "<input type=\"{}\" id=\"{}\" name=\"{}\" [(ngModel)]=\"{}.{}\"{}>",
        col.html_input.to_type_string(),
        col.name,
        col.name,
        model.names.file_stem,
        col.field,
        attrs
    ));
    w.dedent();
    w.line("</div>");
}

fn write_details(w: &mut CodeWriter, model: &TableModel) {
    for col in &model.columns {
        w.line(format!(
            "<p><strong>{}:</strong> {{{{ {}.{} }}}}</p>",
            col.label, model.names.file_stem, col.field
        ));
    }
}

fn write_loading_footer(w: &mut CodeWriter) {
    w.blank();
    w.line("<ng-template #loading>");
    w.indent();
    w.line("<p>Loading...</p>");
    w.dedent();
    w.line("</ng-template>");
    w.blank();
    w.line("<p *ngIf=\"errorMessage\">{{ errorMessage }}</p>");
}

fn write_insert(w: &mut CodeWriter, model: &TableModel) {
    w.line("<div class=\"insert-container\">");
    w.indent();
    w.line(format!("<h2>Add New {}</h2>", model.names.entity));
    w.line("<form (ngSubmit)=\"onSubmit()\">");
    w.indent();
    // identity values are assigned by the database
    for col in model.columns.iter().filter(|c| !c.is_auto_increment) {
        write_input(w, model, col, false);
    }
    w.line("<button type=\"submit\">Submit</button>");
    w.dedent();
    w.line("</form>");
    w.dedent();
    w.line("</div>");
}

fn write_update(w: &mut CodeWriter, model: &TableModel) {
    w.line(format!(
        "<div class=\"update-container\" *ngIf=\"{}; else loading\">",
        model.names.file_stem
    ));
    w.indent();
    w.line(format!("<h2>Update {}</h2>", model.names.entity));
    w.line("<form (ngSubmit)=\"onSubmit()\">");
    w.indent();
    for col in &model.columns {
        write_input(w, model, col, col.is_key);
    }
    w.line("<button type=\"submit\">Update</button>");
    w.dedent();
    w.line("</form>");
    w.dedent();
    w.line("</div>");
    write_loading_footer(w);
}

fn write_delete(w: &mut CodeWriter, model: &TableModel) {
    w.line(format!(
        "<div class=\"delete-container\" *ngIf=\"{}; else loading\">",
        model.names.file_stem
    ));
    w.indent();
    w.line(format!("<h2>Delete {}</h2>", model.names.entity));
    w.line(format!(
        "<p>Are you sure you want to delete this {}?</p>",
        model.names.file_stem
    ));
    write_details(w, model);
    w.line("<button (click)=\"onDelete()\">Delete</button>");
    w.dedent();
    w.line("</div>");
    write_loading_footer(w);
}

fn write_get(w: &mut CodeWriter, model: &TableModel) {
    w.line(format!(
        "<div class=\"get-container\" *ngIf=\"{}; else loading\">",
        model.names.file_stem
    ));
    w.indent();
    w.line(format!("<h2>{} Details</h2>", model.names.entity));
    write_details(w, model);
    w.dedent();
    w.line("</div>");
    write_loading_footer(w);
}
