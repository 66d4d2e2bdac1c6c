//! `{Table}Entity.cs`: annotated entity class

use crate::codegen::model::TableModel;
use crate::codegen::writer::CodeWriter;

/// Render the entity class of a table
pub fn render_entity(model: &TableModel) -> String {
    let names = &model.names;
    let entity = &names.entity;
    let mut w = CodeWriter::csharp();

    w.lines([
        "using System;",
        "using System.ComponentModel;",
        "using System.ComponentModel.DataAnnotations;",
        "using System.Data;",
    ]);
    if model.needs_sql_server_types {
        w.line("using Microsoft.SqlServer.Types;");
    }
    w.blank();

    w.block(format!("namespace {}", names.entities_namespace), |w| {
        w.block(format!("public class {}", entity), |w| {
            for col in &model.columns {
                if let Some(annotation) = &col.annotation {
                    w.lines(annotation.lines());
                }
                w.line(format!(
                    "public {} {} {{ get; set; }}",
                    col.backend.to_type_string(),
                    col.name
                ));
                w.blank();
            }

            w.line(format!("public {}() {{ }}", entity));
            w.blank();

            let params = model
                .columns
                .iter()
                .map(|c| format!("{} {}", c.backend.to_type_string(), c.name))
                .collect::<Vec<_>>()
                .join(", ");
            w.block(format!("public {}({})", entity, params), |w| {
                for col in &model.columns {
                    w.line(format!("this.{0} = {0};", col.name));
                }
            });
            w.blank();

            w.block(format!("public {}(DataRow row)", entity), |w| {
                for col in &model.columns {
                    w.line(format!(
                        "this.{0} = row.Field<{1}>(\"{0}\");",
                        col.name,
                        col.backend.to_type_string()
                    ));
                }
            });
            w.blank();

            let fields = model
                .columns
                .iter()
                .map(|c| format!("{0}: {{{0}}}", c.name))
                .collect::<Vec<_>>()
                .join(", ");
            w.block("public override string ToString()", |w| {
                w.line(format!("return $\"{} - {}\";", entity, fields));
            });
        });
    });

    w.build()
}
