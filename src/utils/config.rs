#![forbid(unsafe_code)]

use anyhow::{anyhow, Result};
use clap::Parser;
use fs_mistrust::Mistrust;
use lazy_static::lazy_static;
use log::{error, info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;
use std::os::unix::fs::PermissionsExt;
use std::{env, fs, path::Path};

// Greeting Utilities
use crate::utils::{errors::Errors, greeting_utils::get_absolute_path};

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Directory and file locations. Unless otherwise noted, all files and directories
// are relative to the root directory.
const ENV_GREETING_ROOT_DIR : &str = "GREETING_ROOT_DIR";
const DEFAULT_ROOT_DIR      : &str = "~/.greeting";
const CONFIG_DIR            : &str = "/config";
const LOG4RS_CONFIG_FILE    : &str = "/log4rs.yml";    // relative to config dir
const GREETING_CONFIG_FILE  : &str = "/greeting.toml"; // relative to config dir

// Networking.
const DEFAULT_TITLE         : &str = "Greeting Server";
const DEFAULT_HTTP_ADDR     : &str = "http://localhost";
const DEFAULT_HTTP_PORT     : u16  = 3000;

// Used when no log4rs configuration file is installed.
const DEFAULT_LOG_PATTERN   : &str = "{d(%Y-%m-%dT%H:%M:%S%.3f)} {h({l})} {t} - {m}{n}";

// ***************************************************************************
//                             Static Variables
// ***************************************************************************
// Assign the command line arguments BEFORE RUNTIME_CTX is initialized in main.
lazy_static! {
    pub static ref GREETING_ARGS: GreetingArgs = GreetingArgs::parse();
}

// ***************************************************************************
//                             Directory Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// GreetingDirs:
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct GreetingDirs {
    pub root_dir: String,
    pub config_dir: String,
}

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// GreetingArgs:
// ---------------------------------------------------------------------------
#[derive(Debug, Parser)]
#[command(name = "greeting_server", about = "Command line arguments for the Greeting Server.")]
pub struct GreetingArgs {
    /// Specify the server's root data directory.
    ///
    /// This directory contains the configuration files read at startup.
    #[arg(short, long)]
    pub root_dir: Option<String>,

    /// Create the data directories and then exit.
    ///
    /// The data directories will be rooted at a root directory calculated
    /// using the following priority order:
    ///
    ///   1. If set, the value of the GREETING_ROOT_DIR environment variable,
    ///
    ///   2. Otherwise, if set, the value of the --root-dir command line argument,
    ///
    ///   3. Otherwise, ~/.greeting
    ///
    #[arg(short, long)]
    pub create_dirs_only: bool,
}

// ---------------------------------------------------------------------------
// Parms:
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct Parms {
    pub config_file: String,
    pub config: Config,
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
#[derive(Debug)]
pub struct RuntimeCtx {
    pub parms: Parms,
    pub greeting_args: &'static GreetingArgs,
    pub greeting_dirs: GreetingDirs,
}

// ---------------------------------------------------------------------------
// Config:
// ---------------------------------------------------------------------------
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub http_addr: String,
    pub http_port: u16,
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            http_addr: DEFAULT_HTTP_ADDR.to_string(),
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

// ***************************************************************************
//                            Directory Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_greeting_dirs:
// ---------------------------------------------------------------------------
/** Calculate the external data directories, creating any that are missing. */
fn init_greeting_dirs(args: &GreetingArgs) -> Result<GreetingDirs> {
    let mistrust = get_mistrust()?;

    let root_dir = get_root_dir(args);
    check_greeting_dir(&root_dir, "root directory", &mistrust)?;

    let config_dir = root_dir.clone() + CONFIG_DIR;
    check_greeting_dir(&config_dir, "config directory", &mistrust)?;

    Ok(GreetingDirs { root_dir, config_dir })
}

// ---------------------------------------------------------------------------
// check_greeting_dir:
// ---------------------------------------------------------------------------
/** Check that the path is absolute and, if it exists, that is has the proper
 * permissions assigned.  If it doesn't exist, create it.  The mistrust package
 * creates directories with 0o700 permissions.
 */
fn check_greeting_dir(dir: &str, msgname: &str, mistrust: &Mistrust) -> Result<()> {
    let path = Path::new(dir);
    if !path.is_absolute() {
        return Err(anyhow!(Errors::DataDirectory(format!("the {} path must be absolute: {}", msgname, dir))));
    }

    if path.exists() {
        if !path.is_dir() {
            return Err(anyhow!(Errors::DataDirectory(format!("the {} path must be a directory: {}", msgname, dir))));
        }

        // Owner only.
        let perm = path.metadata()?.permissions().mode();
        if perm & 0o777 != 0o700 {
            return Err(anyhow!(Errors::DataDirectory(format!("the {} path must have 0o700 permissions: {}", msgname, dir))));
        }
    } else if let Err(e) = mistrust.make_directory(path) {
        return Err(anyhow!(Errors::DataDirectory(format!("unable to create {:?}: {}", path, e))));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// get_mistrust:
// ---------------------------------------------------------------------------
/** Configure a new mistrust object for initial directory processing. */
fn get_mistrust() -> Result<Mistrust> {
    let mistrust = Mistrust::builder()
        .ignore_prefix(get_absolute_path("~"))
        .trust_group(0)
        .build()?;
    Ok(mistrust)
}

// ---------------------------------------------------------------------------
// get_root_dir:
// ---------------------------------------------------------------------------
fn get_root_dir(args: &GreetingArgs) -> String {
    // Order of precedence:
    //  1. Environment variable
    //  2. Command line --root-dir argument
    //  3. Default location
    //
    let root_dir = env::var(ENV_GREETING_ROOT_DIR).unwrap_or_else(|_| {
        match args.root_dir.clone() {
            Some(r) => r,
            None => DEFAULT_ROOT_DIR.to_string(),
        }
    });

    get_absolute_path(&root_dir)
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the configuration directory if a log4rs.yml file
 * is installed there, otherwise log to the console at info level.
 */
pub fn init_log(dirs: &GreetingDirs) -> Result<()> {
    let logconfig = dirs.config_dir.clone() + LOG4RS_CONFIG_FILE;
    if Path::new(&logconfig).exists() {
        if let Err(e) = log4rs::init_file(&logconfig, Default::default()) {
            return Err(anyhow!("{}\n   {}", Errors::Log4rsInitialization(logconfig), e));
        }
        info!("Log4rs initialized using: {}", logconfig);
    } else {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
            .build();
        let config = LogConfig::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(Root::builder().appender("stdout").build(LevelFilter::Info))?;
        log4rs::init_config(config)?;
        info!("Log4rs initialized with console defaults, no file at: {}", logconfig);
    }
    Ok(())
}

// ***************************************************************************
//                             Parms Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// get_parms:
// ---------------------------------------------------------------------------
/** Retrieve the application parameters from the configuration file in the
 * config directory.  If the file cannot be read the default values are used;
 * a file that cannot be parsed is an error.
 */
fn get_parms(dirs: &GreetingDirs) -> Result<Parms> {
    let config_file = get_absolute_path(&(dirs.config_dir.clone() + GREETING_CONFIG_FILE));
    println!("{}", Errors::ReadingConfigFile(config_file.clone()));
    let contents = match fs::read_to_string(&config_file) {
        Ok(c) => c,
        Err(_) => {
            println!("Unable to read configuration at {}. Using default values.", config_file);
            return Ok(Parms { config_file: Default::default(), config: Config::new() });
        }
    };

    let config = parse_config(&config_file, &contents)?;
    Ok(Parms { config_file, config })
}

// ---------------------------------------------------------------------------
// parse_config:
// ---------------------------------------------------------------------------
fn parse_config(config_file: &str, contents: &str) -> Result<Config> {
    match toml::from_str(contents) {
        Ok(c) => Ok(c),
        Err(e) => {
            let msg = format!("{}\n   {}", Errors::TOMLParseError(config_file.to_string()), e);
            error!("{}", msg);
            Err(anyhow!(msg))
        }
    }
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
/** Create the data directories and read the configuration.  Logging is not
 * yet initialized when this runs, so progress goes to stdout.
 */
pub fn init_runtime_context() -> Result<RuntimeCtx> {
    let greeting_args: &'static GreetingArgs = &GREETING_ARGS;
    let greeting_dirs = init_greeting_dirs(greeting_args)?;
    let parms = get_parms(&greeting_dirs)?;
    Ok(RuntimeCtx { parms, greeting_args, greeting_dirs })
}
