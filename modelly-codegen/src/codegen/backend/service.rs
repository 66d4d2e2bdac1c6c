//! `Services/I{Table}Service.cs` and `Services/{Table}Service.cs`

use crate::codegen::model::TableModel;
use crate::codegen::writer::CodeWriter;

/// Service operations as (return type, name, parameters, access call)
fn operations(model: &TableModel) -> Vec<(String, &'static str, String, String)> {
    let entity = model.names.qualified_entity();
    let key = model.key_backend.to_type_string();

    vec![
        (format!("List<{}>", entity), "GetAll", String::new(), "GetAll()".into()),
        (entity.clone(), "GetById", format!("{} id", key), "Get(id)".into()),
        (
            format!("List<{}>", entity),
            "GetMultiple",
            format!("List<{}> ids", key),
            "GetMultiple(ids)".into(),
        ),
        ("int".into(), "Insert", format!("{} entity", entity), "Insert(entity)".into()),
        (
            "int".into(),
            "InsertMultiple",
            format!("List<{}> items", entity),
            "InsertMultiple(items)".into(),
        ),
        ("int".into(), "Update", format!("{} entity", entity), "Update(entity)".into()),
        (
            "int".into(),
            "UpdateMultiple",
            format!("List<{}> items", entity),
            "UpdateMultiple(items)".into(),
        ),
        ("int".into(), "Delete", format!("{} id", key), "Delete(id)".into()),
        (
            "int".into(),
            "DeleteMultiple",
            format!("List<{}> ids", key),
            "DeleteMultiple(ids)".into(),
        ),
    ]
}

fn write_usings(w: &mut CodeWriter, model: &TableModel, with_access: bool) {
    w.line("using System.Collections.Generic;");
    w.line(format!("using {};", model.names.entities_namespace));
    if with_access {
        w.line(format!("using {};", model.names.access_namespace));
    }
    w.blank();
}

/// Render the service interface
pub fn render_service_interface(model: &TableModel) -> String {
    let names = &model.names;
    let mut w = CodeWriter::csharp();
    write_usings(&mut w, model, false);

    w.block(format!("namespace {}", names.services_namespace), |w| {
        w.block(format!("public interface {}", names.service_interface), |w| {
            for (returns, name, params, _) in operations(model) {
                w.line(format!("{} {}({});", returns, name, params));
            }
        });
    });

    w.build()
}

/// Render the service class delegating to the data-access class
pub fn render_service_class(model: &TableModel) -> String {
    let names = &model.names;
    let access = format!("{}.{}", names.access_namespace, names.access_class);
    let mut w = CodeWriter::csharp();
    write_usings(&mut w, model, true);

    w.block(format!("namespace {}", names.services_namespace), |w| {
        w.block(
            format!(
                "public class {} : {}",
                names.service_class, names.service_interface
            ),
            |w| {
                w.line(format!("private readonly {} _access;", access));
                w.blank();
                w.block(format!("public {}({} access)", names.service_class, access), |w| {
                    w.line("_access = access;");
                });

                for (returns, name, params, call) in operations(model) {
                    w.blank();
                    w.block(format!("public {} {}({})", returns, name, params), |w| {
                        w.line(format!("return _access.{};", call));
                    });
                }
            },
        );
    });

    w.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::batch::ParamBudget;
    use crate::parser::{ColumnSchema, TableSchema};

    fn make_model() -> TableModel {
        let table = TableSchema::new("Users", "Contoso.Api")
            .column(ColumnSchema::new("Id", "bigint").primary_key().auto_increment())
            .column(ColumnSchema::new("Name", "nvarchar"));
        TableModel::build(&table, "Main", ParamBudget::default()).unwrap()
    }

    #[test]
    fn test_service_interface() {
        let code = render_service_interface(&make_model());
        assert!(code.contains("namespace Contoso.Api.Services.Main.Users"));
        assert!(code.contains("public interface IUsersService"));
        assert!(code.contains("List<Contoso.Api.Database.Entities.Main.Users> GetAll();"));
        assert!(code.contains("Contoso.Api.Database.Entities.Main.Users GetById(long id);"));
        assert!(code.contains("int DeleteMultiple(List<long> ids);"));
    }

    #[test]
    fn test_service_class_delegates() {
        let code = render_service_class(&make_model());
        assert!(code.contains("public class UsersService : IUsersService"));
        assert!(code.contains("private readonly Contoso.Api.Database.Access.Main.UsersAccess _access;"));
        assert!(code.contains("return _access.Get(id);"));
        assert!(code.contains("return _access.UpdateMultiple(items);"));
        assert_eq!(code.matches("return _access.").count(), 9);
    }
}
