//! `{table}.ts`: the entity interface

use crate::codegen::model::TableModel;
use crate::codegen::writer::CodeWriter;

pub fn render_interface(model: &TableModel) -> String {
    let mut w = CodeWriter::typescript();
    w.block(format!("export interface {}", model.names.entity), |w| {
        for col in &model.columns {
            w.line(format!("{}: {};", col.field, col.client.to_type_string()));
        }
    });
    w.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::batch::ParamBudget;
    use crate::parser::{ColumnSchema, TableSchema};

    #[test]
    fn test_interface_fields() {
        let table = TableSchema::new("Users", "Contoso")
            .column(ColumnSchema::new("Id", "int").primary_key())
            .column(ColumnSchema::new("FirstName", "nvarchar"))
            .column(ColumnSchema::new("BirthDate", "date"))
            .column(ColumnSchema::new("IsActive", "bit"))
            .column(ColumnSchema::new("Shape", "geometry"));
        let model = TableModel::build(&table, "Main", ParamBudget::default()).unwrap();

        assert_eq!(
            render_interface(&model),
            "export interface Users {\n  id: number;\n  firstname: string;\n  birthdate: Date;\n  isactive: boolean;\n  shape: any;\n}\n"
        );
    }
}
