//! Per-table artifact assembly: every generated file with its relative path

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::backend;
use super::client;
use super::model::{GenerationWarning, TableModel};
use super::naming::ComponentKind;

/// Folder of the C# artifacts below the table folder
pub const BACKEND_DIR: &str = "Net";
/// Folder of the Angular artifacts below the table folder
pub const CLIENT_DIR: &str = "Angular";

/// Logical identity of a generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ArtifactKind {
    BackendConfig,
    BackendEntity,
    BackendAccess,
    BackendServiceInterface,
    BackendService,
    BackendController,
    ClientInterface,
    ClientService,
    ClientServiceSpec,
    ClientMatTableMarkup,
    ClientMatTable,
    ClientInsertComponent,
    ClientInsertMarkup,
    ClientInsertStyle,
    ClientInsertSpec,
    ClientUpdateComponent,
    ClientUpdateMarkup,
    ClientUpdateStyle,
    ClientUpdateSpec,
    ClientDeleteComponent,
    ClientDeleteMarkup,
    ClientDeleteStyle,
    ClientDeleteSpec,
    ClientGetComponent,
    ClientGetMarkup,
    ClientGetStyle,
    ClientGetSpec,
}

impl ArtifactKind {
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            ArtifactKind::BackendConfig
                | ArtifactKind::BackendEntity
                | ArtifactKind::BackendAccess
                | ArtifactKind::BackendServiceInterface
                | ArtifactKind::BackendService
                | ArtifactKind::BackendController
        )
    }

    /// (component, markup, style, spec) kinds of a CRUD component
    fn component(kind: ComponentKind) -> [ArtifactKind; 4] {
        match kind {
            ComponentKind::Insert => [
                ArtifactKind::ClientInsertComponent,
                ArtifactKind::ClientInsertMarkup,
                ArtifactKind::ClientInsertStyle,
                ArtifactKind::ClientInsertSpec,
            ],
            ComponentKind::Update => [
                ArtifactKind::ClientUpdateComponent,
                ArtifactKind::ClientUpdateMarkup,
                ArtifactKind::ClientUpdateStyle,
                ArtifactKind::ClientUpdateSpec,
            ],
            ComponentKind::Delete => [
                ArtifactKind::ClientDeleteComponent,
                ArtifactKind::ClientDeleteMarkup,
                ArtifactKind::ClientDeleteStyle,
                ArtifactKind::ClientDeleteSpec,
            ],
            ComponentKind::Get => [
                ArtifactKind::ClientGetComponent,
                ArtifactKind::ClientGetMarkup,
                ArtifactKind::ClientGetStyle,
                ArtifactKind::ClientGetSpec,
            ],
        }
    }
}

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    /// Path relative to the output root, `/`-separated
    pub relative_path: String,
    pub text: String,
}

/// Everything generated for one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableArtifacts {
    pub table: String,
    pub artifacts: Vec<GeneratedArtifact>,
    pub warnings: Vec<GenerationWarning>,
}

impl TableArtifacts {
    pub fn get(&self, kind: ArtifactKind) -> Option<&GeneratedArtifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(|a| a.relative_path.as_str())
    }
}

impl From<TableArtifacts> for BTreeMap<String, String> {
    fn from(artifacts: TableArtifacts) -> Self {
        artifacts
            .artifacts
            .into_iter()
            .map(|a| (a.relative_path, a.text))
            .collect()
    }
}

struct Emitter {
    artifacts: Vec<GeneratedArtifact>,
}

impl Emitter {
    fn push(&mut self, kind: ArtifactKind, relative_path: String, text: String) {
        debug!("Rendered {}", relative_path);
        self.artifacts.push(GeneratedArtifact {
            kind,
            relative_path,
            text,
        });
    }
}

/// Render the selected stacks of one table, backend first
pub fn emit_table(model: &TableModel, with_backend: bool, with_client: bool) -> TableArtifacts {
    let names = &model.names;
    let mut out = Emitter {
        artifacts: Vec::new(),
    };

    if with_backend {
        let net = format!("{}/{}", names.table, BACKEND_DIR);
        out.push(
            ArtifactKind::BackendConfig,
            format!("{}/Config.cs", net),
            backend::render_config(model),
        );
        out.push(
            ArtifactKind::BackendEntity,
            format!("{}/{}Entity.cs", net, names.table),
            backend::render_entity(model),
        );
        out.push(
            ArtifactKind::BackendAccess,
            format!("{}/{}.cs", net, names.access_class),
            backend::render_access(model),
        );
        out.push(
            ArtifactKind::BackendServiceInterface,
            format!("{}/Services/{}.cs", net, names.service_interface),
            backend::render_service_interface(model),
        );
        out.push(
            ArtifactKind::BackendService,
            format!("{}/Services/{}.cs", net, names.service_class),
            backend::render_service_class(model),
        );
        out.push(
            ArtifactKind::BackendController,
            format!("{}/{}.cs", net, names.controller),
            backend::render_controller(model),
        );
    }

    if with_client {
        let ng = format!("{}/{}", names.table, CLIENT_DIR);
        let stem = &names.file_stem;
        out.push(
            ArtifactKind::ClientInterface,
            format!("{}/{}.ts", ng, stem),
            client::render_interface(model),
        );
        out.push(
            ArtifactKind::ClientService,
            format!("{}/{}-service/{}.service.ts", ng, stem, stem),
            client::render_client_service(model),
        );
        out.push(
            ArtifactKind::ClientServiceSpec,
            format!("{}/{}-service/{}.service.spec.ts", ng, stem, stem),
            client::render_client_service_spec(model),
        );
        out.push(
            ArtifactKind::ClientMatTableMarkup,
            format!("{}/{}-mat-table/{}MatTable.html", ng, stem, stem),
            client::render_mat_table_html(model),
        );
        out.push(
            ArtifactKind::ClientMatTable,
            format!("{}/{}-mat-table/{}MatTable.ts", ng, stem, stem),
            client::render_mat_table_ts(model),
        );

        for kind in ComponentKind::ALL {
            let dir = names.component_stem(kind);
            let base = format!("{}/{}/{}.component", ng, dir, dir);
            let [ts, html, css, spec] = ArtifactKind::component(kind);
            out.push(ts, format!("{}.ts", base), client::render_component_ts(model, kind));
            out.push(
                html,
                format!("{}.html", base),
                client::render_component_html(model, kind),
            );
            out.push(
                css,
                format!("{}.css", base),
                client::render_component_css(model, kind),
            );
            out.push(
                spec,
                format!("{}.spec.ts", base),
                client::render_component_spec(model, kind),
            );
        }
    }

    TableArtifacts {
        table: names.table.clone(),
        artifacts: out.artifacts,
        warnings: model.warnings.clone(),
    }
}
