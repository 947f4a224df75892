use crate::error::Result;
use serde::Serialize;
use tera::{Context, Tera};

pub const MODULE_TEMPLATE_NAME: &str = "module.go";

pub const MODULE_TEMPLATE: &str = r#"// Code generated by inject. DO NOT EDIT.

package {{ package_name }}

import (
	"go.uber.org/fx"

	{{ alias }} "{{ import_path }}"
{%- for import in imports %}
	{{ import.alias }} "{{ import.path }}"
{%- endfor %}
)

// {{ function_name }}Module wires {{ function_name }} together with the modules it depends on.
func {{ function_name }}Module() fx.Option {
	return fx.Options(
{%- for module in modules %}
		{% if module.alias %}{{ module.alias }}.{% endif %}{{ module.function_name }}Module(),
{%- endfor %}
		fx.{% if kind == "invoke" %}Invoke{% else %}Provide{% endif %}({{ alias }}.{{ function_name }}),
	)
}
"#;

/// Values exposed to the module template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleData {
    pub package_name: String,
    pub function_name: String,
    /// Import path of the package declaring the function.
    pub import_path: String,
    pub alias: String,
    /// `invoke` or `provide`.
    pub kind: String,
    /// Dependency modules, one per incoming vertex, in edge order.
    pub modules: Vec<ModuleRef>,
    /// Foreign imports, unique by alias.
    pub imports: Vec<ImportData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleRef {
    /// Empty when the dependency lives in the same package.
    pub alias: String,
    pub function_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportData {
    pub alias: String,
    pub path: String,
}

/// Parsed module template.
pub struct ModuleTemplate {
    tera: Tera,
}

impl ModuleTemplate {
    pub fn new() -> Result<Self> {
        Self::from_source(MODULE_TEMPLATE)
    }

    /// Use a custom template body exposing the [`ModuleData`] fields.
    pub fn from_source(source: &str) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(MODULE_TEMPLATE_NAME, source)?;
        Ok(Self { tera })
    }

    pub fn render(&self, data: &ModuleData) -> Result<String> {
        let context = Context::from_serialize(data)?;
        Ok(self.tera.render(MODULE_TEMPLATE_NAME, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data() -> ModuleData {
        ModuleData {
            package_name: "api".into(),
            function_name: "Serve".into(),
            import_path: "github.com/acme/shop/api".into(),
            alias: "mapi".into(),
            kind: "invoke".into(),
            modules: vec![
                ModuleRef {
                    alias: "mstore".into(),
                    function_name: "NewRepository".into(),
                },
                ModuleRef {
                    alias: String::new(),
                    function_name: "NewRouter".into(),
                },
            ],
            imports: vec![ImportData {
                alias: "mstore".into(),
                path: "github.com/acme/shop/gen/inject/acme/shop/store".into(),
            }],
        }
    }

    #[test]
    fn renders_imports_and_modules() {
        let out = ModuleTemplate::new().unwrap().render(&data()).unwrap();
        let expected = r#"// Code generated by inject. DO NOT EDIT.

package api

import (
	"go.uber.org/fx"

	mapi "github.com/acme/shop/api"
	mstore "github.com/acme/shop/gen/inject/acme/shop/store"
)

// ServeModule wires Serve together with the modules it depends on.
func ServeModule() fx.Option {
	return fx.Options(
		mstore.NewRepositoryModule(),
		NewRouterModule(),
		fx.Invoke(mapi.Serve),
	)
}
"#;
        assert_eq!(out, expected);
    }

    #[test]
    fn provide_kind_uses_fx_provide() {
        let mut data = data();
        data.kind = "provide".into();
        data.modules.clear();
        data.imports.clear();
        let out = ModuleTemplate::new().unwrap().render(&data).unwrap();
        assert!(out.contains("fx.Provide(mapi.Serve)"));
        assert!(!out.contains("mstore"));
    }

    #[test]
    fn broken_template_fails_to_parse() {
        assert!(ModuleTemplate::from_source("{% for x in %}").is_err());
    }
}
