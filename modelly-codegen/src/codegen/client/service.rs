//! `{table}-service/{table}.service.ts` and its spec

use crate::codegen::model::TableModel;
use crate::codegen::writer::CodeWriter;

/// Placeholder host; the generated service is meant to be edited after generation
const API_HOST: &str = "YourApiUrl";

struct ClientCall {
    name: &'static str,
    /// `(params)` declaration
    params: String,
    returns: String,
    /// HttpClient method
    http: &'static str,
    /// Template literal appended to `baseUrl`
    path: String,
    /// Request body for POST / PUT
    body: Option<String>,
    /// Builds `queryParams` from the `ids` array first
    indexed_query: bool,
}

fn calls(model: &TableModel) -> Vec<ClientCall> {
    let entity = &model.names.entity;
    let single = &model.names.file_stem;
    let many = format!("{}List", single);
    let key = model.key_client.to_type_string();

    vec![
        ClientCall {
            name: "getAll",
            params: String::new(),
            returns: format!("{}[]", entity),
            http: "get",
            path: "/GetAll".into(),
            body: None,
            indexed_query: false,
        },
        ClientCall {
            name: "getById",
            params: format!("id: {}", key),
            returns: entity.clone(),
            http: "get",
            path: "/GetById?data=${id}".into(),
            body: None,
            indexed_query: false,
        },
        ClientCall {
            name: "getMultiple",
            params: format!("ids: {}[]", key),
            returns: format!("{}[]", entity),
            http: "get",
            path: "/GetMultiple?${queryParams}".into(),
            body: None,
            indexed_query: true,
        },
        ClientCall {
            name: "insert",
            params: format!("{}: {}", single, entity),
            returns: "number".into(),
            http: "post",
            path: "/Insert".into(),
            body: Some(single.clone()),
            indexed_query: false,
        },
        ClientCall {
            name: "insertMultiple",
            params: format!("{}: {}[]", many, entity),
            returns: "number".into(),
            http: "post",
            path: "/InsertMultiple".into(),
            body: Some(many.clone()),
            indexed_query: false,
        },
        ClientCall {
            name: "update",
            params: format!("{}: {}", single, entity),
            returns: "number".into(),
            http: "put",
            path: "/Update".into(),
            body: Some(single.clone()),
            indexed_query: false,
        },
        ClientCall {
            name: "updateMultiple",
            params: format!("{}: {}[]", many, entity),
            returns: "number".into(),
            http: "put",
            path: "/UpdateMultiple".into(),
            body: Some(many),
            indexed_query: false,
        },
        ClientCall {
            name: "delete",
            params: format!("id: {}", key),
            returns: "number".into(),
            http: "delete",
            path: "/Delete?data=${id}".into(),
            body: None,
            indexed_query: false,
        },
        ClientCall {
            name: "deleteMultiple",
            params: format!("ids: {}[]", key),
            returns: "number".into(),
            http: "delete",
            path: "/DeleteMultiple?${queryParams}".into(),
            body: None,
            indexed_query: true,
        },
    ]
}

/// Render the Angular HTTP service of a table
pub fn render_client_service(model: &TableModel) -> String {
    let names = &model.names;
    let mut w = CodeWriter::typescript();

    w.lines([
        "import { Injectable } from '@angular/core';",
        "import { HttpClient } from '@angular/common/http';",
        "import { Observable, throwError } from 'rxjs';",
        "import { catchError } from 'rxjs/operators';",
    ]);
    w.line(format!(
        "import {{ {} }} from '../{}';",
        names.entity, names.file_stem
    ));
    w.blank();
    w.lines(["@Injectable({", "  providedIn: 'root'", "})"]);
    w.block(format!("export class {}", names.client_service), |w| {
        w.line(format!(
            "private baseUrl = '{}/{}';",
            API_HOST, names.api_route
        ));
        w.blank();
        w.line("constructor(private http: HttpClient) { }");

        for call in calls(model) {
            w.blank();
            w.block(
                format!("{}({}): Observable<{}>", call.name, call.params, call.returns),
                |w| {
                    if call.indexed_query {
                        w.line(
                            "const queryParams = ids.map((id, index) => `data[${index}]=${id}`).join('&');",
                        );
                    }
                    let url = format!("`${{this.baseUrl}}{}`", call.path);
                    let args = match &call.body {
                        Some(body) => format!("{}, {}", url, body),
                        None => url,
                    };
                    w.line(format!(
                        "return this.http.{}<{}>({}).pipe(",
                        call.http, call.returns, args
                    ));
                    w.indent();
                    w.line("catchError(this.handleError)");
                    w.dedent();
                    w.line(");");
                },
            );
        }

        w.blank();
        w.block("private handleError(error: any): Observable<never>", |w| {
            w.line("console.error('An error occurred:', error);");
            w.line("return throwError(() => new Error('Something went wrong; please try again later.'));");
        });
    });

    w.build()
}

/// Render the TestBed spec of the HTTP service
pub fn render_client_service_spec(model: &TableModel) -> String {
    let names = &model.names;
    format!(
        r#"import {{ TestBed }} from '@angular/core/testing';
import {{ HttpClientTestingModule }} from '@angular/common/http/testing';

import {{ {service} }} from './{stem}.service';

describe('{service}', () => {{
  let service: {service};

  beforeEach(() => {{
    TestBed.configureTestingModule({{
      imports: [HttpClientTestingModule]
    }});
    service = TestBed.inject({service});
  }});

  it('should be created', () => {{
    expect(service).toBeTruthy();
  }});
}});
"#,
        service = names.client_service,
        stem = names.file_stem,
    )
}
