//! `{table}-{op}/{table}-{op}.component.{ts,css,spec.ts}`

use crate::codegen::model::TableModel;
use crate::codegen::naming::ComponentKind;
use crate::codegen::type_resolver::ClientType;

/// Route parameter value converted to the key's client type
fn route_id_expr(model: &TableModel, var: &str) -> String {
    match model.key_client {
        ClientType::Number => format!("Number({})", var),
        _ => var.to_string(),
    }
}

/// Render the component class for one CRUD operation
pub fn render_component_ts(model: &TableModel, kind: ComponentKind) -> String {
    let names = &model.names;
    let header = format!(
        r#"import {{ {core} }} from '@angular/core';
{router}import {{ {service} }} from '../{stem}-service/{stem}.service';
import {{ {entity} }} from '../{stem}';

@Component({{
  selector: '{selector}',
  templateUrl: './{file}.component.html',
  styleUrls: ['./{file}.component.css']
}})
"#,
        core = match kind {
            ComponentKind::Insert => "Component",
            _ => "Component, OnInit",
        },
        router = match kind {
            ComponentKind::Insert => "",
            ComponentKind::Delete => "import { ActivatedRoute, Router } from '@angular/router';\n",
            _ => "import { ActivatedRoute } from '@angular/router';\n",
        },
        service = names.client_service,
        entity = names.entity,
        stem = names.file_stem,
        selector = names.component_selector(kind),
        file = names.component_stem(kind),
    );

    let body = match kind {
        ComponentKind::Insert => insert_body(model),
        ComponentKind::Update => update_body(model),
        ComponentKind::Delete => delete_body(model),
        ComponentKind::Get => get_body(model),
    };

    format!("{}{}", header, body)
}

fn insert_body(model: &TableModel) -> String {
    let names = &model.names;
    format!(
        r#"export class {class} {{
  {var}: {entity} = {{}} as {entity};

  constructor(private {service_var}: {service}) {{ }}

  onSubmit(): void {{
    this.{service_var}.insert(this.{var}).subscribe({{
      next: (response) => {{
        console.log('{entity} added successfully:', response);
        this.resetForm();
      }},
      error: (error) => console.error('Failed to add {var}:', error)
    }});
  }}

  private resetForm(): void {{
    this.{var} = {{}} as {entity};
  }}
}}
"#,
        class = names.component_class(ComponentKind::Insert),
        var = names.file_stem,
        entity = names.entity,
        service = names.client_service,
        service_var = names.service_var,
    )
}

/// Shared `ngOnInit` loading the record named by the `id` route parameter
fn load_on_init(model: &TableModel) -> String {
    let names = &model.names;
    format!(
        r#"  ngOnInit(): void {{
    const id = this.route.snapshot.paramMap.get('id');
    if (id === null) {{
      this.errorMessage = 'No {var} id provided in route.';
      return;
    }}
    this.id = {id_expr};
    this.{service_var}.getById(this.id).subscribe({{
      next: (data) => this.{var} = data,
      error: (error) => {{
        console.error('Failed to fetch {var}:', error);
        this.errorMessage = 'Failed to fetch {var}. Please try again later.';
      }}
    }});
  }}
"#,
        var = names.file_stem,
        service_var = names.service_var,
        id_expr = route_id_expr(model, "id"),
    )
}

fn update_body(model: &TableModel) -> String {
    let names = &model.names;
    format!(
        r#"export class {class} implements OnInit {{
  id!: {key};
  {var}?: {entity};
  errorMessage?: string;

  constructor(private route: ActivatedRoute, private {service_var}: {service}) {{ }}

{on_init}
  onSubmit(): void {{
    if (!this.{var}) {{
      return;
    }}
    this.{service_var}.update(this.{var}).subscribe({{
      next: () => console.log('{entity} updated successfully'),
      error: (error) => console.error('Failed to update {var}:', error)
    }});
  }}
}}
"#,
        class = names.component_class(ComponentKind::Update),
        key = model.key_client.to_type_string(),
        var = names.file_stem,
        entity = names.entity,
        service = names.client_service,
        service_var = names.service_var,
        on_init = load_on_init(model),
    )
}

fn delete_body(model: &TableModel) -> String {
    let names = &model.names;
    format!(
        r#"export class {class} implements OnInit {{
  id!: {key};
  {var}?: {entity};
  errorMessage?: string;

  constructor(private route: ActivatedRoute, private router: Router, private {service_var}: {service}) {{ }}

{on_init}
  onDelete(): void {{
    this.{service_var}.delete(this.id).subscribe({{
      next: () => {{
        console.log('{entity} deleted successfully');
        this.router.navigate(['/{var}']);
      }},
      error: (error) => console.error('Failed to delete {var}:', error)
    }});
  }}
}}
"#,
        class = names.component_class(ComponentKind::Delete),
        key = model.key_client.to_type_string(),
        var = names.file_stem,
        entity = names.entity,
        service = names.client_service,
        service_var = names.service_var,
        on_init = load_on_init(model),
    )
}

fn get_body(model: &TableModel) -> String {
    let names = &model.names;
    format!(
        r#"export class {class} implements OnInit {{
  id!: {key};
  {var}?: {entity};
  errorMessage?: string;

  constructor(private route: ActivatedRoute, private {service_var}: {service}) {{ }}

{on_init}}}
"#,
        class = names.component_class(ComponentKind::Get),
        key = model.key_client.to_type_string(),
        var = names.file_stem,
        entity = names.entity,
        service = names.client_service,
        service_var = names.service_var,
        on_init = load_on_init(model),
    )
}

/// Render the empty stylesheet of a component
pub fn render_component_css(model: &TableModel, kind: ComponentKind) -> String {
    format!(
        "/* Styles for {} */\n",
        model.names.component_stem(kind)
    )
}

/// Render the TestBed spec of a component
pub fn render_component_spec(model: &TableModel, kind: ComponentKind) -> String {
    let names = &model.names;
    let imports = match kind {
        ComponentKind::Insert => "HttpClientTestingModule, FormsModule",
        ComponentKind::Update => "HttpClientTestingModule, RouterTestingModule, FormsModule",
        _ => "HttpClientTestingModule, RouterTestingModule",
    };
    let extra = match kind {
        ComponentKind::Insert => "import { FormsModule } from '@angular/forms';\n",
        ComponentKind::Update => {
            "import { RouterTestingModule } from '@angular/router/testing';\nimport { FormsModule } from '@angular/forms';\n"
        }
        _ => "import { RouterTestingModule } from '@angular/router/testing';\n",
    };

    format!(
        r#"import {{ ComponentFixture, TestBed }} from '@angular/core/testing';
import {{ HttpClientTestingModule }} from '@angular/common/http/testing';
{extra}
import {{ {class} }} from './{file}.component';

describe('{class}', () => {{
  let component: {class};
  let fixture: ComponentFixture<{class}>;

  beforeEach(async () => {{
    await TestBed.configureTestingModule({{
      imports: [{imports}],
      declarations: [{class}]
    }})
    .compileComponents();

    fixture = TestBed.createComponent({class});
    component = fixture.componentInstance;
    fixture.detectChanges();
  }});

  it('should create', () => {{
    expect(component).toBeTruthy();
  }});
}});
"#,
        class = names.component_class(kind),
        file = names.component_stem(kind),
    )
}
