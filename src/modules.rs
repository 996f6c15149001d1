//! The module registry (§3 "Module registration", §4.5 "Module handling").
//!
//! Individual runtime library modules (`str`, `http`, `json`, `web`,
//! `sqlite`, `cli`) are out of scope beyond the *registration contract*
//! they expose (§1 Non-goals) — this module models that contract as data
//! and constructs the small representative catalog codegen consults. Per
//! §9's "module registration as global state" redesign flag, both
//! registries are plain structs built once during toolchain
//! initialization and threaded through explicitly, never process-wide
//! singletons.

use std::collections::HashMap;

/// A single function a module exposes.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: &'static str,
    pub arity: usize,
    pub variadic: bool,
    /// One Go expression template per declared parameter, `{0}`..`{n-1}`
    /// substituted with the lowered argument expressions; codegen uses
    /// this directly rather than re-deriving a call shape per function.
    pub go_template: &'static str,
    pub doc: &'static str,
}

/// Maps user-visible command names (derived from strings passed to other
/// module functions, e.g. `cli.cmd "hello"`) to the transformed handler
/// function name codegen should call — §4.5's dispatch-table mechanism.
#[derive(Debug, Clone, Default)]
pub struct DispatchTransform {
    pub entries: HashMap<String, String>,
}

impl DispatchTransform {
    pub fn register(&mut self, command_name: &str, handler_fn: &str) {
        self.entries
            .insert(command_name.to_string(), handler_fn.to_string());
    }
}

#[derive(Debug, Clone)]
pub struct ModuleDef {
    pub name: &'static str,
    /// The type tag used for the module's variable declaration in
    /// generated code (e.g. `*HttpClient`).
    pub type_tag: &'static str,
    pub functions: Vec<FunctionDef>,
    /// The function name that, when called, transfers control to
    /// user-defined handlers discovered at compile time (e.g. `cmd` on
    /// `cli`).
    pub dispatch_entry: Option<&'static str>,
    /// Verbatim Go source embedded in the generated program providing the
    /// module's runtime type and supporting functions.
    pub runtime_template: &'static str,
    /// Import lines the target toolchain needs for this module's
    /// template and call sites.
    pub go_imports: &'static [&'static str],
    /// go.mod-style dependency specs this module's template requires
    /// beyond the standard library.
    pub dependencies: &'static [&'static str],
}

impl ModuleDef {
    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.iter().find(|f| f.name == name)
    }
}

pub struct ModuleRegistry {
    modules: HashMap<&'static str, ModuleDef>,
}

impl ModuleRegistry {
    /// The fixed runtime-module catalog (§1: `str`, `http`, `json`, `web`,
    /// `sqlite`, `cli`), matching `preprocessor::desugar`'s
    /// `MODULE_NAMESPACES` list.
    pub fn standard() -> Self {
        let mut modules = HashMap::new();
        for def in [
            str_module(),
            conv_module(),
            http_module(),
            json_module(),
            web_module(),
            sqlite_module(),
            cli_module(),
        ] {
            modules.insert(def.name, def);
        }
        ModuleRegistry { modules }
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDef> {
        self.modules.get(name)
    }

    /// Every registered module, sorted by name (`rugo doc`'s listing).
    pub fn all(&self) -> Vec<&ModuleDef> {
        let mut defs: Vec<&ModuleDef> = self.modules.values().collect();
        defs.sort_by_key(|d| d.name);
        defs
    }

    pub fn is_runtime_module(name: &str) -> bool {
        matches!(name, "str" | "http" | "json" | "web" | "sqlite" | "cli")
    }
}

fn str_module() -> ModuleDef {
    ModuleDef {
        name: "str",
        type_tag: "",
        functions: vec![
            FunctionDef {
                name: "upcase",
                arity: 1,
                variadic: false,
                go_template: "strings.ToUpper(rugo_to_string({0}))",
                doc: "Uppercase a string.",
            },
            FunctionDef {
                name: "downcase",
                arity: 1,
                variadic: false,
                go_template: "strings.ToLower(rugo_to_string({0}))",
                doc: "Lowercase a string.",
            },
            FunctionDef {
                name: "trim",
                arity: 1,
                variadic: false,
                go_template: "strings.TrimSpace(rugo_to_string({0}))",
                doc: "Trim leading and trailing whitespace.",
            },
            FunctionDef {
                name: "split",
                arity: 2,
                variadic: false,
                go_template: "rugo_box_strings(strings.Split(rugo_to_string({0}), rugo_to_string({1})))",
                doc: "Split a string on a separator.",
            },
        ],
        dispatch_entry: None,
        runtime_template: r#"func rugo_box_strings(parts []string) []interface{} {
	out := make([]interface{}, len(parts))
	for i, p := range parts {
		out[i] = p
	}
	return out
}"#,
        go_imports: &["strings"],
        dependencies: &[],
    }
}

fn http_module() -> ModuleDef {
    ModuleDef {
        name: "http",
        type_tag: "*RugoHttpClient",
        functions: vec![
            FunctionDef {
                name: "get",
                arity: 1,
                variadic: false,
                go_template: "rugo_http_get(rugo_to_string({0}))",
                doc: "Issue a GET request, returning the response body.",
            },
            FunctionDef {
                name: "post",
                arity: 2,
                variadic: false,
                go_template: "rugo_http_post(rugo_to_string({0}), rugo_to_string({1}))",
                doc: "Issue a POST request with a string body.",
            },
        ],
        dispatch_entry: None,
        runtime_template: r#"type RugoHttpClient struct {
	client *http.Client
}

func rugo_http_get(url string) interface{} {
	resp, err := http.Get(url)
	if err != nil {
		return nil
	}
	defer resp.Body.Close()
	body, _ := io.ReadAll(resp.Body)
	return string(body)
}

func rugo_http_post(url string, body string) interface{} {
	resp, err := http.Post(url, "application/octet-stream", strings.NewReader(body))
	if err != nil {
		return nil
	}
	defer resp.Body.Close()
	respBody, _ := io.ReadAll(resp.Body)
	return string(respBody)
}"#,
        go_imports: &["net/http", "io", "strings"],
        dependencies: &[],
    }
}

fn json_module() -> ModuleDef {
    ModuleDef {
        name: "json",
        type_tag: "",
        functions: vec![
            FunctionDef {
                name: "encode",
                arity: 1,
                variadic: false,
                go_template: "rugo_json_encode(rugo_json_prepare({0}))",
                doc: "Serialize a boxed value to a JSON string.",
            },
            FunctionDef {
                name: "decode",
                arity: 1,
                variadic: false,
                go_template: "rugo_json_decode(rugo_to_string({0}))",
                doc: "Parse a JSON string into a boxed value.",
            },
        ],
        dispatch_entry: None,
        runtime_template: r#"func rugo_json_encode(v interface{}) interface{} {
	b, err := json.Marshal(v)
	if err != nil {
		return ""
	}
	return string(b)
}

func rugo_json_decode(s string) interface{} {
	var v interface{}
	if err := json.Unmarshal([]byte(s), &v); err != nil {
		return nil
	}
	return v
}"#,
        go_imports: &["encoding/json"],
        dependencies: &[],
    }
}

fn web_module() -> ModuleDef {
    ModuleDef {
        name: "web",
        type_tag: "*RugoWebServer",
        functions: vec![FunctionDef {
            name: "serve",
            arity: 1,
            variadic: false,
            go_template: "rugo_web_serve(rugo_to_string({0}))",
            doc: "Serve the registered routes on the given address.",
        }],
        dispatch_entry: Some("route"),
        runtime_template: r#"type RugoWebServer struct {
	mux *http.ServeMux
}

func rugo_web_serve(addr string) interface{} {
	return http.ListenAndServe(addr, nil)
}"#,
        go_imports: &["net/http"],
        dependencies: &[],
    }
}

fn sqlite_module() -> ModuleDef {
    ModuleDef {
        name: "sqlite",
        type_tag: "*sql.DB",
        functions: vec![
            FunctionDef {
                name: "open",
                arity: 1,
                variadic: false,
                go_template: "rugo_sqlite_open(rugo_to_string({0}))",
                doc: "Open a SQLite database file.",
            },
            FunctionDef {
                name: "query",
                arity: 2,
                variadic: true,
                go_template: "rugo_sqlite_query({0}, rugo_to_string({1}))",
                doc: "Run a query, returning rows as an array of hashes.",
            },
        ],
        dispatch_entry: None,
        runtime_template: r#"func rugo_sqlite_open(path string) interface{} {
	db, err := sql.Open("sqlite3", path)
	if err != nil {
		return nil
	}
	return db
}

func rugo_sqlite_query(db interface{}, query string) interface{} {
	conn, ok := db.(*sql.DB)
	if !ok {
		return nil
	}
	rows, err := conn.Query(query)
	if err != nil {
		return nil
	}
	defer rows.Close()
	cols, _ := rows.Columns()
	var out []interface{}
	for rows.Next() {
		values := make([]interface{}, len(cols))
		ptrs := make([]interface{}, len(cols))
		for i := range values {
			ptrs[i] = &values[i]
		}
		if rows.Scan(ptrs...) != nil {
			continue
		}
		row := make(map[string]interface{}, len(cols))
		for i, c := range cols {
			row[c] = values[i]
		}
		out = append(out, row)
	}
	return out
}"#,
        go_imports: &["database/sql"],
        dependencies: &["github.com/mattn/go-sqlite3"],
    }
}

fn cli_module() -> ModuleDef {
    ModuleDef {
        name: "cli",
        type_tag: "",
        functions: vec![
            FunctionDef {
                name: "cmd",
                arity: 1,
                variadic: false,
                go_template: "rugo_cli_dispatch({0})",
                doc: "Registers (or, at dispatch time, invokes) a subcommand by name; see the dispatch table this module contributes.",
            },
            FunctionDef {
                name: "arg",
                arity: 1,
                variadic: false,
                go_template: "rugo_cli_arg(int(rugo_to_int({0})))",
                doc: "Reads a positional command-line argument.",
            },
        ],
        dispatch_entry: Some("cmd"),
        runtime_template: r#"func rugo_cli_arg(n int) interface{} {
	args := os.Args[1:]
	if n < 0 || n >= len(args) {
		return nil
	}
	return args[n]
}"#,
        go_imports: &["os"],
        dependencies: &[],
    }
}

/// The target-stdlib bridge registry (§3 "target stdlib bridge"):
/// well-known Go standard-library packages exposed as a table of bridged
/// functions, distinct from the runtime-module registry above.
pub struct StdlibBridge {
    packages: HashMap<&'static str, Vec<FunctionDef>>,
}

impl StdlibBridge {
    pub fn standard() -> Self {
        let mut packages = HashMap::new();
        packages.insert(
            "strings",
            vec![
                FunctionDef {
                    name: "Contains",
                    arity: 2,
                    variadic: false,
                    go_template: "strings.Contains(rugo_to_string({0}), rugo_to_string({1}))",
                    doc: "Bridged from Go's strings.Contains.",
                },
                FunctionDef {
                    name: "Repeat",
                    arity: 2,
                    variadic: false,
                    go_template: "strings.Repeat(rugo_to_string({0}), int(rugo_to_int({1})))",
                    doc: "Bridged from Go's strings.Repeat.",
                },
            ],
        );
        packages.insert(
            "math",
            vec![
                FunctionDef {
                    name: "Sqrt",
                    arity: 1,
                    variadic: false,
                    go_template: "math.Sqrt(rugo_to_float({0}))",
                    doc: "Bridged from Go's math.Sqrt.",
                },
                FunctionDef {
                    name: "Abs",
                    arity: 1,
                    variadic: false,
                    go_template: "math.Abs(rugo_to_float({0}))",
                    doc: "Bridged from Go's math.Abs.",
                },
            ],
        );
        StdlibBridge { packages }
    }

    pub fn is_bridged_package(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Every bridged package and its functions, sorted by package name
    /// (`rugo doc`'s listing).
    pub fn all(&self) -> Vec<(&'static str, &[FunctionDef])> {
        let mut entries: Vec<(&'static str, &[FunctionDef])> =
            self.packages.iter().map(|(k, v)| (*k, v.as_slice())).collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    pub fn function(&self, package: &str, name: &str) -> Option<&FunctionDef> {
        self.packages.get(package)?.iter().find(|f| f.name == name)
    }

    pub fn go_import_for(&self, package: &str) -> Option<&'static str> {
        match package {
            "strings" => Some("strings"),
            "math" => Some("math"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_has_all_six_runtime_modules() {
        let registry = ModuleRegistry::standard();
        for name in ["str", "http", "json", "web", "sqlite", "cli"] {
            assert!(registry.get(name).is_some(), "missing module {}", name);
        }
    }

    #[test]
    fn cli_module_declares_cmd_as_dispatch_entry() {
        let registry = ModuleRegistry::standard();
        let cli = registry.get("cli").unwrap();
        assert_eq!(cli.dispatch_entry, Some("cmd"));
        assert!(cli.function("cmd").is_some());
    }

    #[test]
    fn stdlib_bridge_resolves_strings_contains() {
        let bridge = StdlibBridge::standard();
        assert!(bridge.is_bridged_package("strings"));
        let func = bridge.function("strings", "Contains").unwrap();
        assert_eq!(func.arity, 2);
    }

    #[test]
    fn unknown_module_is_not_registered() {
        let registry = ModuleRegistry::standard();
        assert!(registry.get("not_a_module").is_none());
    }

    #[test]
    fn dispatch_transform_registers_command_to_handler() {
        let mut transform = DispatchTransform::default();
        transform.register("hello", "RugoHandler_hello");
        assert_eq!(
            transform.entries.get("hello").map(String::as_str),
            Some("RugoHandler_hello")
        );
    }
}
