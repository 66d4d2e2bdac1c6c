//! SQL Server to C# / TypeScript / HTML input type mapping

use crate::parser::{ColumnSchema, TableSchema};

/// Every source type the mapping tables know about (lower-case, normalized)
pub const KNOWN_SOURCE_TYPES: &[&str] = &[
    "int",
    "int identity",
    "bigint",
    "smallint",
    "tinyint",
    "decimal",
    "numeric",
    "money",
    "smallmoney",
    "float",
    "real",
    "nvarchar",
    "varchar",
    "char",
    "nchar",
    "text",
    "ntext",
    "xml",
    "json",
    "varchar(max)",
    "nvarchar(max)",
    "date",
    "datetime",
    "datetime2",
    "smalldatetime",
    "uniqueidentifier",
    "bit",
    "binary",
    "varbinary",
    "rowversion",
    "timestamp",
    "image",
    "varbinary(max)",
    "filestream",
    "time",
    "datetimeoffset",
    "geography",
    "geometry",
    "hierarchyid",
    "sql_variant",
    "table",
    "sql_variant_array",
];

/// Which target a source type is translated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Backend,
    Client,
    HtmlInput,
}

/// C# type of an entity property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Int,
    Long,
    Short,
    Byte,
    Decimal,
    Double,
    Single,
    String,
    DateTime,
    Guid,
    Bool,
    Bytes,
    TimeSpan,
    DateTimeOffset,
    SqlGeography,
    SqlGeometry,
    SqlHierarchyId,
    DataTable,
    ObjectArray,
    /// Opaque fallback for `sql_variant` and unmapped types
    Object,
}

impl BackendType {
    /// Get the type string for code generation
    pub fn to_type_string(&self) -> &'static str {
        match self {
            BackendType::Int => "int",
            BackendType::Long => "long",
            BackendType::Short => "short",
            BackendType::Byte => "byte",
            BackendType::Decimal => "decimal",
            BackendType::Double => "double",
            BackendType::Single => "Single",
            BackendType::String => "string",
            BackendType::DateTime => "DateTime",
            BackendType::Guid => "Guid",
            BackendType::Bool => "bool",
            BackendType::Bytes => "byte[]",
            BackendType::TimeSpan => "TimeSpan",
            BackendType::DateTimeOffset => "DateTimeOffset",
            BackendType::SqlGeography => "Microsoft.SqlServer.Types.SqlGeography",
            BackendType::SqlGeometry => "Microsoft.SqlServer.Types.SqlGeometry",
            BackendType::SqlHierarchyId => "Microsoft.SqlServer.Types.SqlHierarchyId",
            BackendType::DataTable => "DataTable",
            BackendType::ObjectArray => "object[]",
            BackendType::Object => "object",
        }
    }

    /// Check if this type lives in Microsoft.SqlServer.Types
    pub fn needs_sql_server_types(&self) -> bool {
        matches!(
            self,
            BackendType::SqlGeography | BackendType::SqlGeometry | BackendType::SqlHierarchyId
        )
    }
}

/// TypeScript type of an interface member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Number,
    String,
    Date,
    Boolean,
    Bytes,
    AnyArray,
    Any,
}

impl ClientType {
    pub fn to_type_string(&self) -> &'static str {
        match self {
            ClientType::Number => "number",
            ClientType::String => "string",
            ClientType::Date => "Date",
            ClientType::Boolean => "boolean",
            ClientType::Bytes => "Uint8Array",
            ClientType::AnyArray => "any[]",
            ClientType::Any => "any",
        }
    }
}

/// `type` attribute of a form `<input>`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlInputType {
    Number,
    Date,
    DateTimeLocal,
    Time,
    Checkbox,
    Text,
}

impl HtmlInputType {
    pub fn to_type_string(&self) -> &'static str {
        match self {
            HtmlInputType::Number => "number",
            HtmlInputType::Date => "date",
            HtmlInputType::DateTimeLocal => "datetime-local",
            HtmlInputType::Time => "time",
            HtmlInputType::Checkbox => "checkbox",
            HtmlInputType::Text => "text",
        }
    }
}

/// Result of [`TypeResolver::map_type`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetType {
    Backend(BackendType),
    Client(ClientType),
    HtmlInput(HtmlInputType),
}

impl TargetType {
    pub fn to_type_string(&self) -> &'static str {
        match self {
            TargetType::Backend(t) => t.to_type_string(),
            TargetType::Client(t) => t.to_type_string(),
            TargetType::HtmlInput(t) => t.to_type_string(),
        }
    }
}

impl std::fmt::Display for TargetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_type_string())
    }
}

/// Data-annotation attributes placed above an entity property, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub attributes: Vec<String>,
}

impl Annotation {
    /// Attributes rendered as `[...]` lines
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.attributes.iter().map(|a| format!("[{}]", a))
    }
}

/// Resolve SQL Server data types to target-stack types
pub struct TypeResolver;

impl TypeResolver {
    /// Map a source type for the given target; unknown types get the opaque fallback
    pub fn map_type(source_type: &str, kind: TargetKind) -> TargetType {
        match kind {
            TargetKind::Backend => TargetType::Backend(Self::backend(source_type)),
            TargetKind::Client => TargetType::Client(Self::client(source_type)),
            TargetKind::HtmlInput => TargetType::HtmlInput(Self::html_input(source_type)),
        }
    }

    /// C# type for a source type
    pub fn backend(source_type: &str) -> BackendType {
        match normalize(source_type).as_str() {
            "int" | "int identity" => BackendType::Int,
            "bigint" => BackendType::Long,
            "smallint" => BackendType::Short,
            "tinyint" => BackendType::Byte,
            "decimal" | "numeric" | "money" | "smallmoney" => BackendType::Decimal,
            "float" => BackendType::Double,
            "real" => BackendType::Single,
            "nvarchar" | "varchar" | "char" | "nchar" | "text" | "ntext" | "xml" | "json"
            | "varchar(max)" | "nvarchar(max)" => BackendType::String,
            "date" | "datetime" | "datetime2" | "smalldatetime" => BackendType::DateTime,
            "uniqueidentifier" => BackendType::Guid,
            "bit" => BackendType::Bool,
            "binary" | "varbinary" | "rowversion" | "timestamp" | "image" | "varbinary(max)"
            | "filestream" => BackendType::Bytes,
            "time" => BackendType::TimeSpan,
            "datetimeoffset" => BackendType::DateTimeOffset,
            "geography" => BackendType::SqlGeography,
            "geometry" => BackendType::SqlGeometry,
            "hierarchyid" => BackendType::SqlHierarchyId,
            "table" => BackendType::DataTable,
            "sql_variant_array" => BackendType::ObjectArray,
            _ => BackendType::Object,
        }
    }

    /// TypeScript type for a source type
    pub fn client(source_type: &str) -> ClientType {
        match normalize(source_type).as_str() {
            "int" | "int identity" | "bigint" | "smallint" | "tinyint" | "decimal" | "numeric"
            | "money" | "smallmoney" | "float" | "real" => ClientType::Number,
            "nvarchar" | "varchar" | "char" | "nchar" | "text" | "ntext" | "xml" | "json"
            | "varchar(max)" | "nvarchar(max)" | "uniqueidentifier" | "time"
            | "datetimeoffset" => ClientType::String,
            "date" | "datetime" | "datetime2" | "smalldatetime" => ClientType::Date,
            "bit" => ClientType::Boolean,
            "binary" | "varbinary" | "rowversion" | "timestamp" | "image" | "varbinary(max)"
            | "filestream" => ClientType::Bytes,
            "sql_variant_array" => ClientType::AnyArray,
            _ => ClientType::Any,
        }
    }

    /// Form input type for a source type
    pub fn html_input(source_type: &str) -> HtmlInputType {
        match normalize(source_type).as_str() {
            "int" | "int identity" | "bigint" | "smallint" | "tinyint" | "decimal" | "numeric"
            | "money" | "smallmoney" | "float" | "real" => HtmlInputType::Number,
            "date" => HtmlInputType::Date,
            "datetime" | "datetime2" | "smalldatetime" | "datetimeoffset" => {
                HtmlInputType::DateTimeLocal
            }
            "time" => HtmlInputType::Time,
            "bit" => HtmlInputType::Checkbox,
            _ => HtmlInputType::Text,
        }
    }

    /// Whether the mapping tables recognize this source type
    pub fn is_known(source_type: &str) -> bool {
        KNOWN_SOURCE_TYPES.contains(&normalize(source_type).as_str())
    }

    /// Validation attributes for a column, with the column name in the message
    pub fn annotation_for(column: &ColumnSchema) -> Option<Annotation> {
        let source = normalize(&column.source_type);
        if !KNOWN_SOURCE_TYPES.contains(&source.as_str()) {
            return None;
        }

        let mut attributes = Vec::new();
        match source.as_str() {
            "decimal" | "numeric" | "float" | "real" => {
                attributes.push("DataType(DataType.Currency)".to_string())
            }
            "nvarchar" | "varchar" => attributes.push("MaxLength(255)".to_string()),
            "char" | "nchar" => attributes.push("MaxLength(1)".to_string()),
            "datetime" | "datetime2" | "smalldatetime" => {
                attributes.push("DataType(DataType.DateTime)".to_string())
            }
            _ => {}
        }
        attributes.push(format!(
            "Required(ErrorMessage = \"The {} field is required.\")",
            column.name
        ));

        Some(Annotation { attributes })
    }

    /// Check if any column needs the Microsoft.SqlServer.Types import
    pub fn needs_sql_server_types(table: &TableSchema) -> bool {
        table
            .columns
            .iter()
            .any(|c| Self::backend(&c.source_type).needs_sql_server_types())
    }
}

/// Lower-case, trim and collapse whitespace; drop a length suffix unless the
/// suffixed spelling is itself a known type (`nvarchar(max)`)
fn normalize(source_type: &str) -> String {
    let collapsed = source_type
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    if KNOWN_SOURCE_TYPES.contains(&collapsed.as_str()) {
        return collapsed;
    }

    // "nvarchar (max)" spelled with a space
    let compact = collapsed.replace(" (", "(");
    if KNOWN_SOURCE_TYPES.contains(&compact.as_str()) {
        return compact;
    }

    match compact.find('(') {
        Some(pos) => compact[..pos].trim_end().to_string(),
        None => compact,
    }
}
