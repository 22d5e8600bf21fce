use std::ffi::{c_int, c_void};

use clap::{Parser, Subcommand};
use log::LevelFilter;
use nativehost::{NativeApi, NativeLibrary, PrimitiveSizes};

/// CLI for the native example library
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the native library
    #[arg(long, env = "NATIVE_LIB", default_value = nativehost::DEFAULT_LIB)]
    lib: String,

    /// Log everything down to trace level
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the greeting produced by the library
    Hello {
        text: String,
    },
    /// Show primitive sizes and check them against this host
    Sizes,
    /// Call `foo` with a callback doubling its argument
    Foo {
        #[arg(allow_negative_numbers = true)]
        value: i32,
    },
}

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => {
            log::error!("Exiting with code={code}");
            std::process::exit(code);
        }
        Err(e) => {
            log::error!("ERROR: {e:?}");
            std::process::exit(1)
        }
    }
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    pretty_env_logger::formatted_timed_builder()
        .format_timestamp_millis()
        .filter_level(if cli.verbose { LevelFilter::Trace } else { LevelFilter::Info })
        .init();

    log::debug!("Opening library: '{}'", cli.lib);
    let lib = NativeLibrary::load(&cli.lib)?;
    match cli.command {
        Commands::Hello { text } => {
            let greeting = lib.greet(&text)?;
            println!("{greeting}");
            Ok(0)
        }
        Commands::Sizes => Ok(show_sizes(&lib)),
        Commands::Foo { value } => {
            println!("{}", lib.invoke(value, double));
            Ok(0)
        }
    }
}

fn show_sizes(lib: &NativeLibrary) -> i32 {
    let sizes = lib.primitive_sizes();
    println!("* int: {}", sizes.int);
    println!("* bool: {}", sizes.bool);
    println!("* pointer: {}", sizes.pointer);
    layout_exit_code(&sizes, &PrimitiveSizes::host())
}

/// Exit code 2 signals a layout the host cannot share with the library.
fn layout_exit_code(sizes: &PrimitiveSizes, host: &PrimitiveSizes) -> i32 {
    match sizes.check_compatible(host) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("{e} (host: {host})");
            2
        }
    }
}

extern "C" fn double(_context: *mut c_void, value: c_int) -> c_int {
    log::trace!("callback invoked with value={value}");
    value.wrapping_mul(2)
}
