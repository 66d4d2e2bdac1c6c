//! `{Table}Access.cs`: ADO.NET data access with embedded SQL templates

use super::csharp_string;
use crate::codegen::batch::{BulkOperation, ConnectionVariant};
use crate::codegen::model::TableModel;
use crate::codegen::sql::{ID_LIST_PLACEHOLDER, ROW_INDEX_PLACEHOLDER};
use crate::codegen::writer::CodeWriter;

const SUPPLIED_PARAMS: &str = "SqlConnection connection, SqlTransaction transaction";

/// Render the data-access class of a table
pub fn render_access(model: &TableModel) -> String {
    let names = &model.names;
    let mut w = CodeWriter::csharp();

    w.lines([
        "using System;",
        "using System.Collections.Generic;",
        "using System.Data;",
        "using System.Linq;",
        "using System.Text;",
        "using Microsoft.Data.SqlClient;",
    ]);
    w.line(format!("using {};", names.entities_namespace));
    w.blank();

    w.block(format!("namespace {}", names.access_namespace), |w| {
        w.block(format!("public class {}", names.access_class), |w| {
            write_constants(w, model);
            w.blank();

            w.line("#region Default Methods");
            w.blank();
            write_ambient_methods(w, model);
            w.line("#endregion Default Methods");
            w.blank();

            w.line("#region Transaction Methods");
            w.blank();
            write_supplied_methods(w, model);
            w.line("#endregion Transaction Methods");
            w.blank();

            w.line("#region Chunk Workers");
            w.blank();
            write_chunk_workers(w, model);
            write_helpers(w);
            w.line("#endregion Chunk Workers");
            w.blank();

            w.line("#region Custom Methods");
            w.blank();
            w.line("#endregion Custom Methods");
        });
    });

    w.build()
}

fn chunk_const(op: BulkOperation, variant: ConnectionVariant) -> String {
    match variant {
        ConnectionVariant::Ambient => format!("{}ChunkSize", op),
        ConnectionVariant::Supplied => format!("{}WithTransactionChunkSize", op),
    }
}

fn write_constants(w: &mut CodeWriter, model: &TableModel) {
    let sql = &model.sql;
    let queries = [
        ("GetQuery", sql.get()),
        ("GetAllQuery", sql.get_all()),
        ("GetMultipleQuery", sql.get_multiple_template()),
        ("InsertQuery", sql.insert()),
        ("InsertRowTemplate", sql.insert_row_template()),
        ("UpdateQuery", sql.update()),
        ("UpdateRowTemplate", sql.update_row_template()),
        ("DeleteQuery", sql.delete()),
        ("DeleteMultipleQuery", sql.delete_multiple_template()),
        ("IdParamTemplate", sql.id_param_template()),
    ];
    for (name, text) in queries {
        w.line(format!(
            "private const string {} = {};",
            name,
            csharp_string(&text)
        ));
    }
    w.blank();

    // Rows per statement so every chunk stays under Config.MAX_BATCH_SIZE parameters
    for variant in [ConnectionVariant::Ambient, ConnectionVariant::Supplied] {
        let chunks = model.chunks(variant);
        for op in BulkOperation::ALL {
            w.line(format!(
                "private const int {} = {};",
                chunk_const(op, variant),
                chunks.get(op)
            ));
        }
    }
}

/// Opens a connection and transaction, runs `body`, which must commit and return
fn write_ambient_scope<F>(w: &mut CodeWriter, model: &TableModel, body: F)
where
    F: FnOnce(&mut CodeWriter),
{
    w.block(
        format!(
            "using (var connection = new SqlConnection({}.Config.GetConnectionString()))",
            model.names.config_namespace
        ),
        |w| {
            w.line("connection.Open();");
            w.block("using (var transaction = connection.BeginTransaction())", body);
        },
    );
}

fn write_ambient_methods(w: &mut CodeWriter, model: &TableModel) {
    let entity = &model.names.entity;
    let key = model.key_backend.to_type_string();

    let singles = [
        (format!("{} Get({} id)", entity, key), "GetWithTransaction(id"),
        (format!("List<{}> GetAll()", entity), "GetAllWithTransaction("),
        (format!("int Insert({} item)", entity), "InsertWithTransaction(item"),
        (format!("int Update({} item)", entity), "UpdateWithTransaction(item"),
        (format!("int Delete({} id)", key), "DeleteWithTransaction(id"),
    ];

    for (signature, call) in singles {
        let sep = if call.ends_with('(') { "" } else { ", " };
        w.block(format!("public {}", signature), |w| {
            write_ambient_scope(w, model, |w| {
                w.line(format!(
                    "var result = {}{}connection, transaction);",
                    call, sep
                ));
                w.line("transaction.Commit();");
                w.line("return result;");
            });
        });
        w.blank();
    }

    for op in BulkOperation::ALL {
        let shape = BulkShape::new(op, model);
        w.block(
            format!("public {} {}({})", shape.returns, op, shape.input_decl),
            |w| {
                shape.write_empty_guard(w);
                write_ambient_scope(w, model, |w| {
                    shape.write_loop(w, ConnectionVariant::Ambient);
                    w.line("transaction.Commit();");
                    w.line("return results;");
                });
            },
        );
        w.blank();
    }
}

fn write_supplied_methods(w: &mut CodeWriter, model: &TableModel) {
    let names = &model.names;
    let entity = &names.entity;
    let key = model.key_backend.to_type_string();
    let key_name = &model.key.name;

    w.block(
        format!(
            "public {} GetWithTransaction({} id, {})",
            entity, key, SUPPLIED_PARAMS
        ),
        |w| {
            w.line("var dataTable = new DataTable();");
            w.block(
                "using (var sqlCommand = new SqlCommand(GetQuery, connection, transaction))",
                |w| {
                    w.line(format!(
                        "sqlCommand.Parameters.AddWithValue({}, id);",
                        csharp_string(&format!("@{}", key_name))
                    ));
                    w.line("new SqlDataAdapter(sqlCommand).Fill(dataTable);");
                },
            );
            w.blank();
            w.line(format!(
                "return dataTable.Rows.Count > 0 ? new {}(dataTable.Rows[0]) : null;",
                entity
            ));
        },
    );
    w.blank();

    w.block(
        format!(
            "public List<{}> GetAllWithTransaction({})",
            entity, SUPPLIED_PARAMS
        ),
        |w| {
            w.line("var dataTable = new DataTable();");
            w.block(
                "using (var sqlCommand = new SqlCommand(GetAllQuery, connection, transaction))",
                |w| {
                    w.line("new SqlDataAdapter(sqlCommand).Fill(dataTable);");
                },
            );
            w.blank();
            w.line(format!(
                "return dataTable.Rows.Cast<DataRow>().Select(row => new {}(row)).ToList();",
                entity
            ));
        },
    );
    w.blank();

    w.block(
        format!(
            "public int InsertWithTransaction({} item, {})",
            entity, SUPPLIED_PARAMS
        ),
        |w| {
            w.block(
                "using (var sqlCommand = new SqlCommand(InsertQuery, connection, transaction))",
                |w| {
                    for col in model.non_key_columns() {
                        w.line(format!(
                            "sqlCommand.Parameters.AddWithValue({}, (object)item.{} ?? DBNull.Value);",
                            csharp_string(&format!("@{}", col.name)),
                            col.name
                        ));
                    }
                    w.blank();
                    if model.sql.returns_identity() {
                        w.line("var result = sqlCommand.ExecuteScalar();");
                        w.line(
                            "return result == null || result == DBNull.Value ? 0 : Convert.ToInt32(result);",
                        );
                    } else {
                        w.line("return sqlCommand.ExecuteNonQuery();");
                    }
                },
            );
        },
    );
    w.blank();

    w.block(
        format!(
            "public int UpdateWithTransaction({} item, {})",
            entity, SUPPLIED_PARAMS
        ),
        |w| {
            w.block(
                "using (var sqlCommand = new SqlCommand(UpdateQuery, connection, transaction))",
                |w| {
                    w.line(format!(
                        "sqlCommand.Parameters.AddWithValue({}, item.{});",
                        csharp_string(&format!("@{}", key_name)),
                        key_name
                    ));
                    for col in model.non_key_columns() {
                        w.line(format!(
                            "sqlCommand.Parameters.AddWithValue({}, (object)item.{} ?? DBNull.Value);",
                            csharp_string(&format!("@{}", col.name)),
                            col.name
                        ));
                    }
                    w.blank();
                    w.line("return sqlCommand.ExecuteNonQuery();");
                },
            );
        },
    );
    w.blank();

    w.block(
        format!(
            "public int DeleteWithTransaction({} id, {})",
            key, SUPPLIED_PARAMS
        ),
        |w| {
            w.block(
                "using (var sqlCommand = new SqlCommand(DeleteQuery, connection, transaction))",
                |w| {
                    w.line(format!(
                        "sqlCommand.Parameters.AddWithValue({}, id);",
                        csharp_string(&format!("@{}", key_name))
                    ));
                    w.line("return sqlCommand.ExecuteNonQuery();");
                },
            );
        },
    );
    w.blank();

    for op in BulkOperation::ALL {
        let shape = BulkShape::new(op, model);
        w.block(
            format!(
                "public {} {}WithTransaction({}, {})",
                shape.returns, op, shape.input_decl, SUPPLIED_PARAMS
            ),
            |w| {
                shape.write_empty_guard(w);
                shape.write_loop(w, ConnectionVariant::Supplied);
                w.line("return results;");
            },
        );
        w.blank();
    }
}

fn write_chunk_workers(w: &mut CodeWriter, model: &TableModel) {
    let entity = &model.names.entity;
    let key_name = &model.key.name;

    // Id-list statements: GetMultiple and DeleteMultiple
    for op in [BulkOperation::GetMultiple, BulkOperation::DeleteMultiple] {
        let shape = BulkShape::new(op, model);
        let query = format!("{}Query", op);
        w.block(
            format!(
                "private {} {}({}, {})",
                shape.returns, shape.worker, shape.input_decl, SUPPLIED_PARAMS
            ),
            |w| {
                if op == BulkOperation::GetMultiple {
                    w.line("var dataTable = new DataTable();");
                }
                w.block(
                    format!(
                        "using (var sqlCommand = new SqlCommand({}.Replace({}, IdList(ids.Count)), connection, transaction))",
                        query,
                        csharp_string(ID_LIST_PLACEHOLDER)
                    ),
                    |w| {
                        w.block("for (int i = 0; i < ids.Count; i++)", |w| {
                            w.line(format!(
                                "sqlCommand.Parameters.AddWithValue({} + i, ids[i]);",
                                csharp_string(&format!("@{}", key_name))
                            ));
                        });
                        if op == BulkOperation::GetMultiple {
                            w.line("new SqlDataAdapter(sqlCommand).Fill(dataTable);");
                        } else {
                            w.line("return sqlCommand.ExecuteNonQuery();");
                        }
                    },
                );
                if op == BulkOperation::GetMultiple {
                    w.blank();
                    w.line(format!(
                        "return dataTable.Rows.Cast<DataRow>().Select(row => new {}(row)).ToList();",
                        entity
                    ));
                }
            },
        );
        w.blank();
    }

    // Row-template statements: InsertMultiple and UpdateMultiple
    for (op, template) in [
        (BulkOperation::InsertMultiple, "InsertRowTemplate"),
        (BulkOperation::UpdateMultiple, "UpdateRowTemplate"),
    ] {
        let shape = BulkShape::new(op, model);
        w.block(
            format!(
                "private int {}(List<{}> items, {})",
                shape.worker, entity, SUPPLIED_PARAMS
            ),
            |w| {
                w.block(
                    format!(
                        "using (var sqlCommand = new SqlCommand(RenderRows({}, items.Count), connection, transaction))",
                        template
                    ),
                    |w| {
                        w.block("for (int i = 0; i < items.Count; i++)", |w| {
                            for col in model.non_key_columns() {
                                w.line(format!(
                                    "sqlCommand.Parameters.AddWithValue({} + i, (object)items[i].{} ?? DBNull.Value);",
                                    csharp_string(&format!("@{}", col.name)),
                                    col.name
                                ));
                            }
                            if op == BulkOperation::UpdateMultiple {
                                w.line(format!(
                                    "sqlCommand.Parameters.AddWithValue({} + i, items[i].{});",
                                    csharp_string(&format!("@{}", key_name)),
                                    key_name
                                ));
                            }
                        });
                        w.line("return sqlCommand.ExecuteNonQuery();");
                    },
                );
            },
        );
        w.blank();
    }
}

fn write_helpers(w: &mut CodeWriter) {
    let placeholder = csharp_string(ROW_INDEX_PLACEHOLDER);

    w.block("private static string IdList(int count)", |w| {
        w.line(format!(
            "return string.Join(\",\", Enumerable.Range(0, count).Select(i => IdParamTemplate.Replace({}, i.ToString())));",
            placeholder
        ));
    });
    w.blank();

    w.block(
        "private static string RenderRows(string rowTemplate, int count)",
        |w| {
            w.line("var query = new StringBuilder();");
            w.block("for (int i = 0; i < count; i++)", |w| {
                w.line("if (i > 0) query.Append(' ');");
                w.line(format!(
                    "query.Append(rowTemplate.Replace({}, i.ToString()));",
                    placeholder
                ));
            });
            w.line("return query.ToString();");
        },
    );
    w.blank();

    w.block(
        "private static IEnumerable<List<TItem>> Chunk<TItem>(List<TItem> items, int chunkSize)",
        |w| {
            w.block(
                "for (int start = 0; start < items.Count; start += chunkSize)",
                |w| {
                    w.line("yield return items.GetRange(start, Math.Min(chunkSize, items.Count - start));");
                },
            );
        },
    );
    w.blank();
}

/// Signature pieces shared by the public bulk methods and their chunk worker
struct BulkShape {
    op: BulkOperation,
    returns: String,
    input_decl: String,
    input: &'static str,
    worker: String,
    collects_rows: bool,
}

impl BulkShape {
    fn new(op: BulkOperation, model: &TableModel) -> Self {
        let entity = &model.names.entity;
        let key = model.key_backend.to_type_string();
        let (returns, input_decl, input, collects_rows) = match op {
            BulkOperation::GetMultiple => (
                format!("List<{}>", entity),
                format!("List<{}> ids", key),
                "ids",
                true,
            ),
            BulkOperation::DeleteMultiple => {
                ("int".to_string(), format!("List<{}> ids", key), "ids", false)
            }
            BulkOperation::InsertMultiple | BulkOperation::UpdateMultiple => (
                "int".to_string(),
                format!("List<{}> items", entity),
                "items",
                false,
            ),
        };

        Self {
            op,
            returns,
            input_decl,
            input,
            worker: format!("{}Chunk", op),
            collects_rows,
        }
    }

    fn write_empty_guard(&self, w: &mut CodeWriter) {
        w.block(
            format!("if ({0} == null || {0}.Count == 0)", self.input),
            |w| {
                if self.collects_rows {
                    w.line(format!("return new {}();", self.returns));
                } else {
                    w.line("return 0;");
                }
            },
        );
        w.blank();
    }

    fn write_loop(&self, w: &mut CodeWriter, variant: ConnectionVariant) {
        if self.collects_rows {
            w.line(format!("var results = new {}();", self.returns));
        } else {
            w.line("int results = 0;");
        }
        w.block(
            format!(
                "foreach (var chunk in Chunk({}, {}))",
                self.input,
                chunk_const(self.op, variant)
            ),
            |w| {
                if self.collects_rows {
                    w.line(format!(
                        "results.AddRange({}(chunk, connection, transaction));",
                        self.worker
                    ));
                } else {
                    w.line(format!(
                        "results += {}(chunk, connection, transaction);",
                        self.worker
                    ));
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::batch::ParamBudget;
    use crate::parser::{ColumnSchema, TableSchema};

    fn make_model(auto_increment: bool) -> TableModel {
        let mut id = ColumnSchema::new("Id", "int").primary_key();
        id.is_auto_increment = auto_increment;
        let table = TableSchema::new("Users", "Contoso.Api")
            .column(id)
            .column(ColumnSchema::new("Name", "nvarchar"))
            .column(ColumnSchema::new("Email", "nvarchar"));
        TableModel::build(&table, "Main", ParamBudget::default()).unwrap()
    }

    #[test]
    fn test_access_embeds_sql_templates() {
        let code = render_access(&make_model(true));

        assert!(code.contains("namespace Contoso.Api.Database.Access.Main"));
        assert!(code.contains("using Contoso.Api.Database.Entities.Main;"));
        assert!(code.contains("public class UsersAccess"));
        assert!(code.contains(
            "private const string UpdateQuery = \"UPDATE [Users] SET [Name] = @Name, [Email] = @Email WHERE [Id] = @Id\";"
        ));
        assert!(code.contains("OUTPUT INSERTED.[Id]"));
        assert!(code.contains(
            "private const string InsertRowTemplate = \"INSERT INTO [Users] ([Name],[Email]) VALUES (@Name{i},@Email{i});\";"
        ));
        assert!(code.contains("Convert.ToInt32(result)"));
    }

    #[test]
    fn test_access_without_identity() {
        let code = render_access(&make_model(false));
        assert!(!code.contains("OUTPUT INSERTED"));
        assert!(!code.contains("ExecuteScalar"));
    }

    #[test]
    fn test_access_chunk_constants() {
        let code = render_access(&make_model(true));
        assert!(code.contains("private const int GetMultipleChunkSize = 1000;"));
        assert!(code.contains("private const int InsertMultipleChunkSize = 333;"));
        assert!(code.contains("private const int UpdateMultipleChunkSize = 333;"));
        assert!(code.contains("private const int InsertMultipleWithTransactionChunkSize = 250;"));
        assert!(code.contains("foreach (var chunk in Chunk(items, UpdateMultipleWithTransactionChunkSize))"));
    }

    #[test]
    fn test_access_has_both_variants() {
        let code = render_access(&make_model(true));
        for method in [
            "public Users Get(int id)",
            "public List<Users> GetAll()",
            "public List<Users> GetMultiple(List<int> ids)",
            "public int Insert(Users item)",
            "public int InsertMultiple(List<Users> items)",
            "public int Update(Users item)",
            "public int UpdateMultiple(List<Users> items)",
            "public int Delete(int id)",
            "public int DeleteMultiple(List<int> ids)",
            "public Users GetWithTransaction(int id, SqlConnection connection, SqlTransaction transaction)",
            "public int DeleteMultipleWithTransaction(List<int> ids, SqlConnection connection, SqlTransaction transaction)",
            "private int InsertMultipleChunk(List<Users> items, SqlConnection connection, SqlTransaction transaction)",
        ] {
            assert!(code.contains(method), "missing `{}`", method);
        }

        // Ambient methods commit; supplied ones never do
        let transaction_region = code
            .split("#region Transaction Methods")
            .nth(1)
            .and_then(|rest| rest.split("#endregion Transaction Methods").next())
            .unwrap();
        assert!(!transaction_region.contains("Commit()"));
        assert_eq!(code.matches("transaction.Commit();").count(), 9);
    }

    #[test]
    fn test_access_binds_zero_based_parameters() {
        let code = render_access(&make_model(true));
        assert!(code.contains("sqlCommand.Parameters.AddWithValue(\"@Name\" + i, (object)items[i].Name ?? DBNull.Value);"));
        assert!(code.contains("sqlCommand.Parameters.AddWithValue(\"@Id\" + i, items[i].Id);"));
        assert!(code.contains("for (int i = 0; i < count; i++)"));
    }
}
