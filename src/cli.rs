//! The CLI.

use {
    crate::{
        error::Error,
        git2::{OidExt, RepositoryExt},
        prefix::{propose_prefix, PrefixArg, DEFAULT_DIGITS, DEFAULT_SUFFIX},
        search::{SearchOutcome, Searcher, DEFAULT_MAX_MINUTES},
        template::commit_to_template,
    },
    ::{
        clap::{AppSettings, Parser},
        color_eyre::Section,
        eyre::{Report, Result, WrapErr},
        git2::{ObjectType, Oid, Repository},
        lazy_static::lazy_static,
        std::env,
        tracing::{debug, info, instrument, trace},
    },
};

macro_rules! lazy_ref {
    { $type:ty = $($tt:tt)+ } => {
        {
            lazy_static! {
                static ref VALUE: $type = { $($tt)+ };
            }
            VALUE.as_str()
        }
    }
}

/// Would you like a beautiful commit ID?
///
/// Searches for new author and committer timestamps, a few seconds or
/// minutes later than the current ones, that would give a commit an ID
/// starting with PREFIX. Nothing is modified: the `git commit --amend`
/// command that applies the new timestamps is printed instead.
#[derive(Parser, Debug, Clone)]
#[clap(
    after_help = lazy_ref! { String = format!(
        "https://docs.rs/{name}/{version}\nhttps://crates.io/crates/{name}/{version}",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"))
    },
    max_term_width = max_term_width(),
    setting = AppSettings::DeriveDisplayOrder
            | AppSettings::DontCollapseArgsInUsage
            | AppSettings::InferLongArgs,
    version,
)]
pub struct Args {
    /// The target commit ID prefix, in lowercase hex, or `auto`.
    ///
    /// `auto` counts up from the parent commit's ID: if it starts with
    /// `0007`, the target is `0008a`. Without a parent commit, the target is
    /// `0001a`.
    #[clap(name = "PREFIX")]
    pub prefix: PrefixArg,

    /// The commit to beautify. It must be the commit `HEAD` points to,
    /// since the proposal amends `HEAD`.
    #[clap(long, short = 'r', env = "BEAUTIFY_REVISION", default_value = "HEAD")]
    pub revision: String,

    /// How many minutes into the future the timestamps may move.
    #[clap(
        long,
        short = 'm',
        env = "BEAUTIFY_MAX_MINUTES",
        default_value_t = DEFAULT_MAX_MINUTES
    )]
    pub max_minutes: u32,

    /// How many leading digits of the parent commit ID count up with `auto`.
    #[clap(
        long,
        short = 'd',
        default_value_t = DEFAULT_DIGITS,
        parse(try_from_str = parse_digits)
    )]
    pub digits: usize,

    /// What follows the counter with `auto`.
    #[clap(long, default_value = DEFAULT_SUFFIX)]
    pub suffix: String,

    /// How many threads to search with.
    ///
    /// [default: one per CPU]
    #[clap(long, short = 'j', env = "BEAUTIFY_JOBS")]
    pub jobs: Option<usize>,

    /// Search on a single thread.
    #[clap(long)]
    pub sequential: bool,

    /// Decrease log verbosity. May be used multiple times.
    #[clap(long, short = 'q', parse(from_occurrences))]
    pub quiet: i32,

    /// Increase log verbosity. May be used multiple times.
    #[clap(long, short = 'v', parse(from_occurrences))]
    pub verbose: i32,
}

fn parse_digits(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".into()),
        Ok(digits) => Ok(digits),
        Err(err) => Err(err.to_string()),
    }
}

/// Used to override the `max_term_width` of our derived [`Args`]
/// using the **build time** environment variable `MAX_TERM_WIDTH`.
fn max_term_width() -> usize {
    option_env!("MAX_TERM_WIDTH")
        .and_then(|width| width.parse().ok())
        .unwrap_or(100)
}

/// CLI entry point.
///
/// # Errors
///
/// For any failure to propose new timestamps, including when no timestamps
/// within `--max-minutes` give the prefix.
#[instrument(level = "debug", skip(args))]
pub fn main(args: Args) -> Result<()> {
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .wrap_err("Failed to start search threads")?;
    }

    let repo = Repository::open_from_env().wrap_err("No Git repository found")?;
    debug!("Found Git repository: {:?}", repo.path());

    let (id, raw) = repo
        .raw_commit(&args.revision)
        .wrap_err_with(|| format!("Failed to load commit {:?}", args.revision))?;
    check_head(&repo, &args.revision, id)?;

    let prefix = match args.prefix {
        PrefixArg::Explicit(ref prefix) => prefix.clone(),
        PrefixArg::Auto => {
            let parent = format!("{}^", args.revision);
            let previous = repo.resolve_commit_id(&parent)?.map(|id| id.to_string());
            let prefix = propose_prefix(previous.as_deref(), args.digits, &args.suffix)
                .suggestion("Pass an explicit PREFIX instead of `auto`.")?;
            info!("Using automatic prefix {prefix:?}");
            prefix
        },
    };

    let (template, fields) = commit_to_template(&raw)?;
    check_template(id, &template.render_fields(&fields))?;
    trace!("Base timestamps: {fields:?}");

    let outcome = Searcher::new(&template, &fields, &prefix)?
        .max_minutes(args.max_minutes)
        .parallel(!args.sequential)
        .search();

    match outcome {
        Ok(SearchOutcome::NoOp) => {
            println!("Nothing to do");
        },
        Ok(SearchOutcome::Found(proposal)) => {
            info!("New commit ID will be {}", proposal.id);
            println!("Proposal:");
            println!("{proposal}");
        },
        Err(err @ Error::Exhausted { .. }) => {
            return Err(Report::from(err).suggestion(
                "Try a shorter prefix or a larger --max-minutes, or change the commit and try \
                 again.",
            ));
        },
        Err(err) => return Err(err.into()),
    }

    Ok(())
}

/// Makes sure `revision` is the commit `git commit --amend` would rewrite.
fn check_head(repo: &Repository, revision: &str, id: Oid) -> Result<(), Error> {
    let head = repo.resolve_commit_id("HEAD")?;
    if head == Some(id) {
        Ok(())
    } else {
        Err(Error::NotHead {
            revision: revision.to_string(),
            id: id.to_string(),
            head: head.map_or_else(|| "unborn".to_string(), |head| head.to_string()),
        })
    }
}

/// Makes sure the template renders back into the commit we loaded, so the
/// digests we compute are real commit IDs.
fn check_template(id: Oid, rendered: &[u8]) -> Result<(), Error> {
    let actual = Oid::for_object(ObjectType::Commit, rendered)?;
    if actual == id {
        Ok(())
    } else {
        Err(Error::TemplateMismatch {
            expected: id.to_string(),
            actual: actual.to_string(),
        })
    }
}

/// Initializes the global environment (error reporting and logging) and
/// parses the [Args] for the [main] CLI entry point.
///
/// # Errors
///
/// If called more than once, or if other code has already installed an
/// error report handler.
pub fn init() -> Result<Args> {
    color_eyre::install()?;

    let args = Args::parse();

    let default_verbosity = 3;

    let log_env = env::var("RUST_LOG").unwrap_or_default();

    let log_level = if args.verbose == 0 && args.quiet == 0 && !log_env.is_empty() {
        log_env
    } else {
        match default_verbosity + args.verbose - args.quiet {
            i32::MIN..=0 => "off".into(),
            1 => "error".into(),
            2 => "warn".into(),
            3 => "info".into(),
            4 => "debug".into(),
            5..=i32::MAX => "trace".into(),
        }
    };

    tracing_subscriber::util::SubscriberInitExt::init(tracing_subscriber::Layer::with_subscriber(
        tracing_error::ErrorLayer::default(),
        tracing_subscriber::fmt()
            .with_env_filter(::tracing_subscriber::EnvFilter::new(log_level))
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_span_events(
                tracing_subscriber::fmt::format::FmtSpan::ENTER
                    | tracing_subscriber::fmt::format::FmtSpan::CLOSE,
            )
            .compact()
            .finish(),
    ));

    trace!("Initialized from: {:#?}", args);

    Ok(args)
}
