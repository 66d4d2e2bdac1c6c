//! `{table}-mat-table/{table}MatTable.{html,ts}`: paginated material table listing

use crate::codegen::model::TableModel;
use crate::codegen::writer::CodeWriter;

const PAGE_SIZES: &str = "[5, 10, 20]";

pub fn render_mat_table_html(model: &TableModel) -> String {
    let mut w = CodeWriter::typescript();
    w.line("<div class=\"mat-elevation-z8\">");
    w.indent();
    w.line("<table mat-table [dataSource]=\"dataSource\">");
    w.indent();
    for col in &model.columns {
        w.line(format!("<ng-container matColumnDef=\"{}\">", col.field));
        w.indent();
        w.line(format!(
            "<th mat-header-cell *matHeaderCellDef>{}</th>",
            col.label
        ));
        w.line(format!(
            "<td mat-cell *matCellDef=\"let element\">{{{{ element.{} }}}}</td>",
            col.field
        ));
        w.dedent();
        w.line("</ng-container>");
    }
    w.blank();
    w.line("<tr mat-header-row *matHeaderRowDef=\"displayedColumns\"></tr>");
    w.line("<tr mat-row *matRowDef=\"let row; columns: displayedColumns;\"></tr>");
    w.dedent();
    w.line("</table>");
    w.blank();
    w.line(format!(
        "<mat-paginator [pageSizeOptions]=\"{}\" showFirstLastButtons aria-label=\"Select page of {}\"></mat-paginator>",
        PAGE_SIZES, model.names.file_stem
    ));
    w.dedent();
    w.line("</div>");
    w.build()
}

pub fn render_mat_table_ts(model: &TableModel) -> String {
    let names = &model.names;
    let mut w = CodeWriter::typescript();

    w.lines([
        "import { AfterViewInit, Component, ViewChild } from '@angular/core';",
        "import { MatPaginator } from '@angular/material/paginator';",
        "import { MatTableDataSource } from '@angular/material/table';",
    ]);
    w.line(format!(
        "import {{ {} }} from '../{}-service/{}.service';",
        names.client_service, names.file_stem, names.file_stem
    ));
    w.line(format!(
        "import {{ {} }} from '../{}';",
        names.entity, names.file_stem
    ));
    w.blank();
    w.lines([
        "@Component({".to_string(),
        format!("  selector: '{}',", names.mat_table_selector()),
        format!("  templateUrl: './{}MatTable.html'", names.file_stem),
        "})".to_string(),
    ]);
    w.block(
        format!("export class {} implements AfterViewInit", names.mat_table_class),
        |w| {
            let fields: Vec<String> = model
                .columns
                .iter()
                .map(|c| format!("'{}'", c.field))
                .collect();
            w.line(format!("displayedColumns: string[] = [{}];", fields.join(", ")));
            w.line(format!(
                "dataSource = new MatTableDataSource<{}>();",
                names.entity
            ));
            w.blank();
            w.line("@ViewChild(MatPaginator) paginator!: MatPaginator;");
            w.blank();
            w.line(format!(
                "constructor(private {}: {}) {{ }}",
                names.service_var, names.client_service
            ));
            w.blank();
            w.block("ngAfterViewInit(): void", |w| {
                w.line("this.dataSource.paginator = this.paginator;");
                w.line("this.fetchData();");
            });
            w.blank();
            w.block("fetchData(): void", |w| {
                w.line(format!(
                    "this.{}.getAll().subscribe(data => this.dataSource.data = data);",
                    names.service_var
                ));
            });
        },
    );

    w.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::batch::ParamBudget;
    use crate::parser::{ColumnSchema, TableSchema};

    fn make_model() -> TableModel {
        let table = TableSchema::new("Users", "Contoso")
            .column(ColumnSchema::new("Id", "int").primary_key())
            .column(ColumnSchema::new("FirstName", "nvarchar"));
        TableModel::build(&table, "Main", ParamBudget::default()).unwrap()
    }

    #[test]
    fn test_mat_table_html_columns() {
        let html = render_mat_table_html(&make_model());
        assert!(html.contains("<ng-container matColumnDef=\"firstname\">"));
        assert!(html.contains("<th mat-header-cell *matHeaderCellDef>First Name</th>"));
        assert!(html.contains("<td mat-cell *matCellDef=\"let element\">{{ element.firstname }}</td>"));
        assert!(html.contains("[pageSizeOptions]=\"[5, 10, 20]\""));
    }

    #[test]
    fn test_mat_table_component() {
        let ts = render_mat_table_ts(&make_model());
        assert!(ts.contains("import { UsersService } from '../users-service/users.service';"));
        assert!(ts.contains("selector: 'app-users-mat-table',"));
        assert!(ts.contains("templateUrl: './usersMatTable.html'"));
        assert!(ts.contains("export class UsersMatTable implements AfterViewInit {"));
        assert!(ts.contains("displayedColumns: string[] = ['id', 'firstname'];"));
        assert!(ts.contains("this.usersService.getAll().subscribe(data => this.dataSource.data = data);"));
    }
}
