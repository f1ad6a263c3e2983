//! The two wrapper templates: API routes and pages.

use super::{
    LoadedEnvFile, PageBuildParameters,
    codegen::{Declaration, Expr, Module, Property, Statement},
    devalue::{self, Literal},
    route::{RouteKind, escape_build_id, is_dynamic_route},
};
use crate::{
    common::{join_href, normalize_path_sep},
    manifest::{BUILD_MANIFEST, REACT_LOADABLE_MANIFEST, ROUTES_MANIFEST},
};
use std::{fmt, path::Path};

const FETCH_POLYFILL: &str = "next/dist/server/node-polyfill-fetch";
const ENV_MODULE: &str = "@next/env";
const CONFIG_MODULE: &str = "next/config";
const API_HANDLER_MODULE: &str =
    "next/dist/build/webpack/loaders/next-serverless-loader/api-handler";
const PAGE_HANDLER_MODULE: &str =
    "next/dist/build/webpack/loaders/next-serverless-loader/page-handler";

/// Combines the rewrites of the routes manifest into a single list, in order of precedence.
const COMBINE_REWRITES: &str = r#"const combinedRewrites = Array.isArray(routesManifest.rewrites)
  ? routesManifest.rewrites
  : []

if (!Array.isArray(routesManifest.rewrites)) {
  combinedRewrites.push(...routesManifest.rewrites.beforeFiles)
  combinedRewrites.push(...routesManifest.rewrites.afterFiles)
  combinedRewrites.push(...routesManifest.rewrites.fallback)
}"#;

/// The data fetching functions, including the legacy ones, exported by the page wrapper.
const DATA_EXPORTS: &[&str] = &[
    "getStaticProps",
    "getStaticPaths",
    "getServerSideProps",
    "unstable_getStaticParams",
    "unstable_getStaticProps",
    "unstable_getStaticPaths",
    "unstable_getServerProps",
];

/// The generated wrapper module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedModule {
    pub kind: RouteKind,
    /// The exported names, `default` for the default export.
    pub exports: Vec<String>,
    pub source: String,
}

impl fmt::Display for GeneratedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Values shared by both templates.
struct Context {
    pages_dir: String,
    routes_manifest: String,
    page_is_dynamic: bool,
    encoded_preview_props: Literal,
}

/// Generate the wrapper module of a page.
///
/// The session cookie prefix is derived from the project, see
/// [`crate::config::session_cookie_prefix`].
pub fn synthesize(params: &PageBuildParameters, session_cookie_prefix: &str) -> GeneratedModule {
    let context = Context {
        pages_dir: normalize_path_sep(&params.pages_dir),
        routes_manifest: join_href(Path::new(&params.dist_dir), ROUTES_MANIFEST),
        page_is_dynamic: is_dynamic_route(&params.page),
        encoded_preview_props: params.preview_props.clone().into(),
    };

    let kind = RouteKind::of(&params.page);
    let module = match kind {
        RouteKind::Api => api_module(params, &context, session_cookie_prefix),
        RouteKind::Page => page_module(params, &context, session_cookie_prefix),
    };

    GeneratedModule {
        kind,
        exports: module.exports(),
        source: module.render(),
    }
}

fn api_module(params: &PageBuildParameters, context: &Context, cookie_prefix: &str) -> Module {
    let mut module = Module::default();

    module
        .extend(env_loading(&params.loaded_env_files))
        .extend(runtime_config(params))
        .push(Statement::ImportSideEffect {
            from: FETCH_POLYFILL.into(),
        })
        .push(Statement::import_default(
            "routesManifest",
            &context.routes_manifest,
        ))
        .push(Statement::ImportNamed {
            bindings: vec!["getApiHandler".into()],
            from: API_HANDLER_MODULE.into(),
        })
        .extend(set_env(&context.pages_dir, cookie_prefix))
        .push(Statement::Raw(COMBINE_REWRITES.into()))
        .push(Statement::constant(
            "apiHandler",
            Expr::call(
                "getApiHandler",
                vec![Expr::Object(vec![
                    Property::new(
                        "pageModule",
                        Expr::Require(params.absolute_page_path.clone()),
                    ),
                    Property::new("rewrites", Expr::ident("combinedRewrites")),
                    Property::new("i18n", i18n(params)),
                    Property::new("page", Expr::string(&params.page)),
                    Property::new("basePath", Expr::string(&params.base_path)),
                    Property::new("pageIsDynamic", Literal::Bool(context.page_is_dynamic)),
                    Property::new("encodedPreviewProps", context.encoded_preview_props.clone()),
                ])],
            ),
        ))
        .push(Statement::ExportDefault("apiHandler".into()));

    module
}

fn page_module(params: &PageBuildParameters, context: &Context, cookie_prefix: &str) -> Module {
    let dist_dir = Path::new(&params.dist_dir);
    let mut module = Module::default();

    module
        .push(Statement::ImportSideEffect {
            from: FETCH_POLYFILL.into(),
        })
        .push(Statement::import_default(
            "routesManifest",
            &context.routes_manifest,
        ))
        .push(Statement::import_default(
            "buildManifest",
            join_href(dist_dir, BUILD_MANIFEST),
        ))
        .push(Statement::import_default(
            "reactLoadableManifest",
            join_href(dist_dir, REACT_LOADABLE_MANIFEST),
        ))
        .extend(env_loading(&params.loaded_env_files))
        .extend(runtime_config(params))
        .push(Statement::ImportNamed {
            bindings: vec!["getPageHandler".into()],
            from: PAGE_HANDLER_MODULE.into(),
        })
        .extend(set_env(&context.pages_dir, cookie_prefix))
        .push(Statement::constant(
            "documentModule",
            Expr::Require(params.absolute_document_path.clone()),
        ))
        .push(Statement::constant(
            "appMod",
            Expr::Require(params.absolute_app_path.clone()),
        ))
        .push(Statement::Declare {
            kind: Declaration::Let,
            name: "App".into(),
            init: Expr::module_default("appMod"),
            export: false,
        })
        .push(Statement::constant(
            "compMod",
            Expr::Require(params.absolute_page_path.clone()),
        ))
        .push(Statement::constant(
            "Component",
            Expr::module_default("compMod"),
        ))
        .push(Statement::ExportDefault("Component".into()))
        .extend(
            DATA_EXPORTS
                .iter()
                .map(|name| Statement::export_const(name, Expr::module_property("compMod", name))),
        )
        .push(Statement::Declare {
            kind: Declaration::Let,
            name: "config".into(),
            init: Expr::module_property_or("compMod", "config", "{}"),
            export: true,
        })
        .push(Statement::export_const("_app", Expr::ident("App")))
        .push(Statement::Raw(COMBINE_REWRITES.into()))
        .push(Statement::Destructure {
            names: vec!["renderReqToHTML".into(), "render".into()],
            init: Expr::call("getPageHandler", vec![page_handler_options(params, context)]),
        })
        .push(Statement::ExportNamed(vec![
            "renderReqToHTML".into(),
            "render".into(),
        ]));

    module
}

fn page_handler_options(params: &PageBuildParameters, context: &Context) -> Expr {
    let not_found_module = match &params.absolute_404_path {
        Some(path) => Expr::Require(path.clone()),
        None => Expr::ident("undefined"),
    };

    Expr::Object(vec![
        Property::new("pageModule", Expr::ident("compMod")),
        Property::new("pageComponent", Expr::ident("Component")),
        Property::new("pageConfig", Expr::ident("config")),
        Property::new("appModule", Expr::ident("App")),
        Property::shorthand("documentModule"),
        Property::new(
            "errorModule",
            Expr::Require(params.absolute_error_path.clone()),
        ),
        Property::new("notFoundModule", not_found_module),
        Property::new("pageGetStaticProps", Expr::ident("getStaticProps")),
        Property::new("pageGetStaticPaths", Expr::ident("getStaticPaths")),
        Property::new("pageGetServerSideProps", Expr::ident("getServerSideProps")),
        Property::new("assetPrefix", Expr::string(&params.asset_prefix)),
        Property::new("canonicalBase", Expr::string(&params.canonical_base)),
        Property::new("generateEtags", Literal::Bool(params.generate_etags)),
        Property::new("poweredByHeader", Literal::Bool(params.powered_by_header)),
        Property::shorthand("runtimeConfig"),
        Property::shorthand("buildManifest"),
        Property::shorthand("reactLoadableManifest"),
        Property::new("rewrites", Expr::ident("combinedRewrites")),
        Property::new("i18n", i18n(params)),
        Property::new("page", Expr::string(&params.page)),
        Property::new("buildId", Expr::string(&params.build_id)),
        Property::new(
            "escapedBuildId",
            Expr::string(escape_build_id(&params.build_id)),
        ),
        Property::new("basePath", Expr::string(&params.base_path)),
        Property::new("pageIsDynamic", Literal::Bool(context.page_is_dynamic)),
        Property::new("encodedPreviewProps", context.encoded_preview_props.clone()),
    ])
}

/// Load the environment files into `process.env`.
fn env_loading(files: &[LoadedEnvFile]) -> Vec<Statement> {
    let files = Literal::Array(
        files
            .iter()
            .map(|file| {
                Literal::Object(vec![
                    ("path".into(), file.path.as_str().into()),
                    ("contents".into(), file.contents.as_str().into()),
                ])
            })
            .collect(),
    );

    vec![
        Statement::Destructure {
            names: vec!["processEnv".into()],
            init: Expr::Require(ENV_MODULE.into()),
        },
        Statement::Expr(Expr::call("processEnv", vec![files.into()])),
    ]
}

/// Declare `runtimeConfig`, and make it available through `next/config` when it is used.
///
/// This must run before any other module is required.
fn runtime_config(params: &PageBuildParameters) -> Vec<Statement> {
    match &params.runtime_config {
        Some(config) => vec![
            Statement::Destructure {
                names: vec!["setConfig".into()],
                init: Expr::Require(CONFIG_MODULE.into()),
            },
            Statement::constant("runtimeConfig", Literal::from(config.clone())),
            Statement::Expr(Expr::call("setConfig", vec![Expr::ident("runtimeConfig")])),
        ],
        None => vec![Statement::constant("runtimeConfig", Expr::raw("{}"))],
    }
}

fn set_env(pages_dir: &str, cookie_prefix: &str) -> Vec<Statement> {
    vec![
        Statement::Assign {
            target: "process.env.BLITZ_APP_DIR".into(),
            value: Expr::raw(format!(
                "process.env.VERCEL && !process.env.CI ? '/var/task/' : {}",
                devalue::quote(pages_dir)
            )),
        },
        Statement::Assign {
            target: "process.env.__BLITZ_SESSION_COOKIE_PREFIX".into(),
            value: Expr::string(cookie_prefix),
        },
    ]
}

fn i18n(params: &PageBuildParameters) -> Expr {
    match &params.i18n {
        Some(i18n) => Literal::from(i18n.clone()).into(),
        None => Expr::ident("undefined"),
    }
}
