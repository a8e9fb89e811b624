use clap::{Args, Parser, Subcommand};
use foprep::{
    FilesystemStylesheetSource, GeneratorError, NamespaceBinding, OutputFormat, Transformer,
    XSL_FO_NAMESPACE,
};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Preprocesses XML and CSS into XSL-FO, optionally running the formatter.
#[derive(Parser, Debug)]
#[command(name = "foprep", version, about)]
struct Cli {
    /// Log at debug level (RUST_LOG still takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Style and namespace-qualify an XML file, writing XSL-FO.
    Transform {
        /// Input XML file, or `-` for stdin.
        input: PathBuf,
        /// Stylesheet to apply; repeat in cascade order.
        #[arg(short = 's', long = "stylesheet")]
        stylesheets: Vec<String>,
        /// Directory stylesheet names are relative to.
        #[arg(long, default_value = ".")]
        style_dir: PathBuf,
        /// Output encoding label.
        #[arg(long)]
        encoding: Option<String>,
        #[arg(long, default_value = "fo")]
        prefix: String,
        #[arg(long, default_value = XSL_FO_NAMESPACE)]
        uri: String,
        /// Output file; stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a Handlebars template with JSON parameters and build a document.
    Render {
        template: PathBuf,
        /// JSON object with the template parameters.
        params: PathBuf,
        #[arg(short = 's', long = "stylesheet")]
        stylesheets: Vec<String>,
        #[arg(long, default_value = ".")]
        style_dir: PathBuf,
        #[arg(short, long, default_value = "pdf")]
        format: OutputFormat,
        /// Formatter command; defaults to $FOP_CMD or `fop` on PATH.
        #[arg(long)]
        fop_cmd: Option<PathBuf>,
        /// Extra argument passed to the formatter; repeatable.
        #[arg(long = "fop-arg", allow_hyphen_values = true)]
        fop_args: Vec<String>,
        #[command(flatten)]
        fops: FopsArgs,
        /// Directory for generated documents.
        #[arg(long)]
        temp_dir: Option<PathBuf>,
        /// Only print the XSL-FO instead of building the document.
        #[arg(long)]
        xslfo: bool,
    },
}

#[derive(Args, Debug)]
struct FopsArgs {
    /// Format on the fops server at this host instead of running a command.
    #[arg(long = "fops-host")]
    host: Option<String>,
    #[arg(long = "fops-port", default_value_t = 3000)]
    port: u16,
    /// Basic auth user for the fops server.
    #[arg(long = "fops-user", requires = "host")]
    user: Option<String>,
    #[arg(long = "fops-password", requires = "user")]
    password: Option<String>,
}

fn main() -> Result<(), GeneratorError> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Command::Transform {
            input,
            stylesheets,
            style_dir,
            encoding,
            prefix,
            uri,
            output,
        } => {
            let xml = read_input(&input)?;
            let transformer = Transformer::builder()
                .with_namespace(NamespaceBinding::new(prefix, uri))
                .with_source(Arc::new(FilesystemStylesheetSource::new(style_dir)))
                .build()?;
            let xslfo = transformer.transform(&xml, &stylesheets, encoding.as_deref())?;
            match output {
                Some(path) => fs::write(path, xslfo)?,
                None => io::stdout().write_all(&xslfo)?,
            }
        }
        Command::Render {
            template,
            params,
            stylesheets,
            style_dir,
            format,
            fop_cmd,
            fop_args,
            fops,
            temp_dir,
            xslfo,
        } => {
            let params: serde_json::Value = serde_json::from_str(&fs::read_to_string(params)?)?;
            let mut builder = foprep::DocumentGenerator::builder()
                .with_template_file(template)?
                .with_style_dir(style_dir)
                .with_stylesheets(stylesheets)
                .with_output_format(format)
                .with_fop_args(fop_args);
            if let Some(dir) = temp_dir {
                builder = builder.with_temp_dir(dir);
            }
            if let Some(command) = fop_cmd {
                builder = builder.with_fop_command(command);
            }
            #[cfg(feature = "fops")]
            if let Some(host) = fops.host {
                builder = builder.with_fops(host, fops.port);
                if let Some(user) = fops.user {
                    builder = builder.with_fops_basic_auth(user, fops.password.unwrap_or_default());
                }
            }
            #[cfg(not(feature = "fops"))]
            if fops.host.is_some() {
                return Err(GeneratorError::Config(
                    "fops support is not enabled in this build".to_string(),
                ));
            }
            let generator = builder.build()?;

            if xslfo {
                io::stdout().write_all(&generator.generate_xslfo(&params)?)?;
            } else {
                let path = generator.generate(&params, None)?;
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}

fn read_input(input: &PathBuf) -> io::Result<String> {
    if input.as_os_str() == "-" {
        let mut xml = String::new();
        io::stdin().read_to_string(&mut xml)?;
        Ok(xml)
    } else {
        fs::read_to_string(input)
    }
}
