#![forbid(unsafe_code)]

use anyhow::Result;
use log::info;
use poem::{listener::TcpListener, Route};
use poem_openapi::OpenApiService;

// Greeting Utilities
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx};
use crate::utils::errors::Errors;
use crate::v1::greeting::GreetingApi;
use crate::v1::version::VersionApi;

// Modules
mod utils;
mod v1;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "GreetingServer"; // for poem logging
const API_VERSION : &str = "0.0.1";

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<()> {
    // --------------- Initialize Server --------------
    println!("Starting greeting_server!");

    // Read parameters and create the data directories.
    let ctx = init_runtime_context()?;
    if ctx.greeting_args.create_dirs_only {
        println!("Data directories created under {}, exiting.", ctx.greeting_dirs.root_dir);
        return Ok(());
    }

    // Initialize the server.
    greeting_init(&ctx)?;

    // --------------- Main Loop Set Up ---------------
    // Assign base URL.
    let server_url = format!("{}:{}{}",
        ctx.parms.config.http_addr,
        ctx.parms.config.http_port,
        "/v1");

    let endpoints = (GreetingApi::new(), VersionApi);
    let api_service =
        OpenApiService::new(endpoints, ctx.parms.config.title.as_str(), API_VERSION).server(server_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();

    // Create the routes and run the server.
    let addr = format!("{}{}", "0.0.0.0:", ctx.parms.config.http_port);
    let ui = api_service.swagger_ui();
    let app = Route::new()
        .nest("/v1", api_service)
        .nest("/", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml);

    // ------------------ Main Loop -------------------
    info!("Listening on {}.", addr);
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run(app)
        .await
        .map_err(Errors::from)?;
    Ok(())
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// greeting_init:
// ---------------------------------------------------------------------------
/** Initialize all subsystems other than those needed to configure the main
 * loop processor.
 */
fn greeting_init(ctx: &RuntimeCtx) -> Result<()> {
    // Configure our log.
    init_log(&ctx.greeting_dirs)?;

    // Record what we're running with.
    info!("{}", Errors::InputParms(format!("{:#?}", ctx)));
    info!("Configuration file: {}", if ctx.parms.config_file.is_empty() {"<defaults>"} else {ctx.parms.config_file.as_str()});

    // Log build info.
    print_version_info();
    Ok(())
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running GREETING={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}.",
          option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
          env!("GIT_BRANCH"),
          env!("GIT_COMMIT_SHORT"),
          env!("GIT_DIRTY"),
          env!("SOURCE_TIMESTAMP"),
          env!("RUSTC_VERSION"));
}
