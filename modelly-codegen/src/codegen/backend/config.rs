//! `Config.cs`: connection string holder and batch budget

use crate::codegen::model::TableModel;

/// Render the shared data-access configuration class
pub fn render_config(model: &TableModel) -> String {
    format!(
        r#"using System;
using System.Collections.Generic;
using System.Data;
using System.Text;

namespace {ns}
{{
    public interface IConfig
    {{
    }}

    public class Config : IConfig
    {{
        /// <summary>
        /// Maximum number of query parameters sent in one statement
        /// </summary>
        public const int MAX_BATCH_SIZE = {budget};

        public static string _connectionString {{ get; set; }} = "";

        public Config(string connectionString)
        {{
            _connectionString = connectionString;
        }}

        public static string GetConnectionString()
        {{
            return _connectionString;
        }}
    }}
}}
"#,
        ns = model.names.config_namespace,
        budget = model.budget.budget,
    )
}
