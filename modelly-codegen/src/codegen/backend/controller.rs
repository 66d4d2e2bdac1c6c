//! `{Table}Controller.cs`: ASP.NET Core API controller over the service

use crate::codegen::model::TableModel;
use crate::codegen::writer::CodeWriter;

/// Response message of the catch-all handler
const GENERIC_ERROR: &str = "An unexpected error occurred.";

#[derive(Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    /// Returns the payload, 404 when nothing was found
    Read,
    /// Returns the affected count, 400 when nothing changed
    Write,
}

struct Action {
    name: &'static str,
    verb: &'static str,
    kind: ActionKind,
    /// Parameter declaration, empty for GetAll
    param: String,
    response_type: String,
}

fn action(
    name: &'static str,
    verb: &'static str,
    kind: ActionKind,
    param: String,
    response_type: &str,
) -> Action {
    Action {
        name,
        verb,
        kind,
        param,
        response_type: response_type.to_string(),
    }
}

fn actions(model: &TableModel) -> Vec<Action> {
    let entity = model.names.qualified_entity();
    let key = model.key_backend.to_type_string();
    let list = format!("List<{}>", entity);
    let keys = format!("List<{}>", key);

    vec![
        action("GetAll", "HttpGet", ActionKind::Read, String::new(), &list),
        action("GetById", "HttpGet", ActionKind::Read, format!("{} data", key), &entity),
        action(
            "GetMultiple",
            "HttpGet",
            ActionKind::Read,
            format!("[FromQuery] {} data", keys),
            &list,
        ),
        action("Insert", "HttpPost", ActionKind::Write, format!("{} data", entity), "int"),
        action("InsertMultiple", "HttpPost", ActionKind::Write, format!("{} data", list), "int"),
        action("Update", "HttpPut", ActionKind::Write, format!("{} data", entity), "int"),
        action("UpdateMultiple", "HttpPut", ActionKind::Write, format!("{} data", list), "int"),
        action("Delete", "HttpDelete", ActionKind::Write, format!("{} data", key), "int"),
        action(
            "DeleteMultiple",
            "HttpDelete",
            ActionKind::Write,
            format!("[FromQuery] {} data", keys),
            "int",
        ),
    ]
}

/// Render the API controller of a table
pub fn render_controller(model: &TableModel) -> String {
    let names = &model.names;
    let service_field = format!("_{}", names.service_var);
    let mut w = CodeWriter::csharp();

    w.lines([
        "using System;",
        "using System.Collections.Generic;",
        "using Microsoft.AspNetCore.Mvc;",
        "using Microsoft.Extensions.Logging;",
    ]);
    w.line(format!("using {};", names.services_namespace));
    w.blank();

    w.block(format!("namespace {}", names.controllers_namespace), |w| {
        w.line("[ApiController]");
        w.line("[Route(\"[controller]/[action]\")]");
        w.block(
            format!("public class {} : ControllerBase", names.controller),
            |w| {
                w.line(format!("private const string MODULE = \"{}\";", names.table));
                w.line(format!(
                    "private readonly ILogger<{}> _logger;",
                    names.controller
                ));
                w.line(format!(
                    "private readonly {} {};",
                    names.service_interface, service_field
                ));
                w.blank();
                w.block(
                    format!(
                        "public {}(ILogger<{}> logger, {} {})",
                        names.controller, names.controller, names.service_interface, names.service_var
                    ),
                    |w| {
                        w.line("_logger = logger;");
                        w.line(format!("{} = {};", service_field, names.service_var));
                    },
                );

                for action in actions(model) {
                    w.blank();
                    write_action(w, model, &service_field, &action);
                }
            },
        );
    });

    w.build()
}

fn write_action(w: &mut CodeWriter, model: &TableModel, service_field: &str, action: &Action) {
    let args = if action.param.is_empty() { "" } else { "data" };

    w.line(format!(
        "[{}(Name = \"{}{}\")]",
        action.verb, model.names.table, action.name
    ));
    w.line(format!(
        "[ProducesResponseType(typeof({}), 200)]",
        action.response_type
    ));
    w.block(
        format!("public IActionResult {}({})", action.name, action.param),
        |w| {
            w.block("try", |w| {
                w.line(format!(
                    "var result = {}.{}({});",
                    service_field, action.name, args
                ));
                match action.kind {
                    ActionKind::Read => {
                        w.block("if (result == null)", |w| {
                            w.line("return NotFound();");
                        });
                        w.line("return Ok(result);");
                    }
                    ActionKind::Write => {
                        w.block("if (result > 0)", |w| {
                            w.line("return Ok(result);");
                        });
                        w.line(format!(
                            "return BadRequest(\"Failed to {} data.\");",
                            action.name.to_lowercase()
                        ));
                    }
                }
            });
            w.block("catch (Exception e)", |w| {
                w.line(format!(
                    "_logger.LogError(e, \"{{Module}}.{} failed\", MODULE);",
                    action.name
                ));
                w.line(format!("return StatusCode(500, \"{}\");", GENERIC_ERROR));
            });
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::batch::ParamBudget;
    use crate::parser::{ColumnSchema, TableSchema};

    fn make_model() -> TableModel {
        let table = TableSchema::new("Users", "Contoso.Api")
            .column(ColumnSchema::new("Id", "int").primary_key().auto_increment())
            .column(ColumnSchema::new("Name", "nvarchar"));
        TableModel::build(&table, "Main", ParamBudget::default()).unwrap()
    }

    #[test]
    fn test_controller_actions() {
        let code = render_controller(&make_model());

        assert!(code.contains("namespace Contoso.Api.Controllers"));
        assert!(code.contains("[Route(\"[controller]/[action]\")]"));
        assert!(code.contains("public class UsersController : ControllerBase"));
        assert!(code.contains(
            "public UsersController(ILogger<UsersController> logger, IUsersService usersService)"
        ));
        for action in [
            "GetAll()",
            "GetById(int data)",
            "GetMultiple([FromQuery] List<int> data)",
            "Insert(Contoso.Api.Database.Entities.Main.Users data)",
            "InsertMultiple(List<Contoso.Api.Database.Entities.Main.Users> data)",
            "Update(Contoso.Api.Database.Entities.Main.Users data)",
            "UpdateMultiple(List<Contoso.Api.Database.Entities.Main.Users> data)",
            "Delete(int data)",
            "DeleteMultiple([FromQuery] List<int> data)",
        ] {
            assert!(
                code.contains(&format!("public IActionResult {}", action)),
                "missing action {}",
                action
            );
        }
    }

    #[test]
    fn test_controller_error_handling() {
        let code = render_controller(&make_model());

        assert_eq!(code.matches("catch (Exception e)").count(), 9);
        assert_eq!(
            code.matches("return StatusCode(500, \"An unexpected error occurred.\");")
                .count(),
            9
        );
        assert!(code.contains("_logger.LogError(e, \"{Module}.Insert failed\", MODULE);"));
        assert!(code.contains("return NotFound();"));
        assert!(code.contains("return BadRequest(\"Failed to deletemultiple data.\");"));
        assert!(code.contains("[HttpPut(Name = \"UsersUpdate\")]"));
        assert!(code.contains("var result = _usersService.GetAll();"));
    }
}
