use clap::{Args as ClapArgs, Parser, Subcommand};
use dotdata_core::{
    Direction, EnvelopeConfig, JsonOpts, Key, Operator, PathAccessor, QueryOps, flatten,
};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "dotdata",
    about = "Query and edit JSON documents by dot path",
    version
)]
struct Cli {
    /// Path segment delimiter
    #[arg(long, global = true, default_value_t = '.')]
    delimiter: char,
    /// Wrap output in a response envelope
    #[arg(long, global = true, default_value_t = false)]
    envelope: bool,
    /// Emit compact JSON instead of pretty-printed
    #[arg(long, global = true, default_value_t = false)]
    compact: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Get value at path
    Get(GetArgs),
    /// Check whether a path resolves (segment walk only)
    Has(PathArgs),
    /// Set value (raw JSON) at path; prints or writes with --out
    Set(SetArgs),
    /// Remove the key at path; prints or writes with --out
    Forget(ForgetArgs),
    /// Flatten nested arrays and mappings into one array
    Flatten(FlattenArgs),
    /// List every leaf path
    Paths(FileArgs),
    /// List children at path
    List(ListArgs),
    /// Filter records by comparing the value at a path
    Where(WhereArgs),
    /// Group records by the value at a path
    Group(GroupArgs),
    /// Collect the value at a path from every record
    Pluck(PluckArgs),
    /// Stable sort of records by the value at a path
    Sort(SortArgs),
}

#[derive(ClapArgs, Debug)]
struct FileArgs {
    /// JSON file to load
    file: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct PathArgs {
    /// JSON file to load
    file: PathBuf,
    /// Delimited path, e.g. user.address.city
    #[arg(long)]
    path: String,
}

#[derive(ClapArgs, Debug)]
struct GetArgs {
    /// JSON file to load
    file: PathBuf,
    /// Delimited path, e.g. user.address.city
    #[arg(long)]
    path: String,
    /// Raw JSON printed when the path does not resolve; otherwise exit 3
    #[arg(long)]
    default: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct SetArgs {
    /// JSON file to load
    file: PathBuf,
    /// Delimited path, e.g. user.address.city
    #[arg(long)]
    path: String,
    /// New value as raw JSON (e.g., 123, true, "str", {"a":1})
    #[arg(long)]
    value: String,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct ForgetArgs {
    /// JSON file to load
    file: PathBuf,
    /// Delimited path, e.g. user.address.city
    #[arg(long)]
    path: String,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct FlattenArgs {
    /// JSON file to load
    file: PathBuf,
    /// Max levels to descend; unlimited when omitted
    #[arg(long)]
    depth: Option<usize>,
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
    /// JSON file to load
    file: PathBuf,
    /// Delimited path; lists the document root when omitted
    #[arg(long, default_value = "")]
    path: String,
}

#[derive(ClapArgs, Debug)]
struct CollectionArgs {
    /// JSON file to load
    file: PathBuf,
    /// Path of the record array inside the document; the document itself when omitted
    #[arg(long)]
    at: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct WhereArgs {
    #[command(flatten)]
    src: CollectionArgs,
    /// Path resolved in each record
    #[arg(long)]
    path: String,
    /// One of = != > >= < <= in not_in
    #[arg(long)]
    op: String,
    /// Operand as raw JSON
    #[arg(long)]
    value: String,
}

#[derive(ClapArgs, Debug)]
struct GroupArgs {
    #[command(flatten)]
    src: CollectionArgs,
    /// Path of the grouping key in each record
    #[arg(long)]
    key: String,
}

#[derive(ClapArgs, Debug)]
struct PluckArgs {
    #[command(flatten)]
    src: CollectionArgs,
    /// Path of the value to collect
    #[arg(long)]
    value: String,
    /// Path of the key to index results by
    #[arg(long)]
    key: Option<String>,
}

#[derive(ClapArgs, Debug)]
struct SortArgs {
    #[command(flatten)]
    src: CollectionArgs,
    /// Path of the sort key in each record
    #[arg(long)]
    key: String,
    /// asc or desc
    #[arg(long, default_value = "asc")]
    direction: String,
}

struct Ctx {
    ops: QueryOps,
    envelope: Option<EnvelopeConfig>,
    json: JsonOpts,
}

impl Ctx {
    fn accessor(&self) -> &PathAccessor {
        self.ops.accessor()
    }

    fn print(&self, value: Value) {
        let value = match &self.envelope {
            Some(cfg) => cfg.success(value).to_api_value(),
            None => value,
        };
        match dotdata_core::json::to_json_string(&value, self.json) {
            Ok(s) => println!("{}", s),
            Err(e) => fail(5, &format!("error writing: {}", e)),
        }
    }

    fn not_found(&self, path: &str) -> ! {
        if let Some(cfg) = &self.envelope {
            let env = cfg.not_found().with_message(format!("not found: {}", path));
            println!("{}", env.to_api_value());
        } else {
            eprintln!("not found: {}", path);
        }
        std::process::exit(3);
    }

    fn finish_edit(&self, doc: Value, out: Option<PathBuf>) {
        match out {
            Some(out) => {
                dotdata_core::write_json_to_file(&out, &doc, self.json)
                    .unwrap_or_else(|e| fail(5, &format!("error writing: {}", e)));
                tracing::info!(path = %out.display(), "document written");
            }
            None => self.print(doc),
        }
    }
}

fn fail(code: i32, msg: &str) -> ! {
    eprintln!("{}", msg);
    std::process::exit(code);
}

fn load(path: &Path) -> Value {
    dotdata_core::read_json_file(path).unwrap_or_else(|e| fail(2, &format!("error: {}", e)))
}

fn parse_raw(flag: &str, raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| fail(3, &format!("invalid --{} JSON: {}", flag, e)))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = Ctx {
        ops: QueryOps::new(PathAccessor::new(cli.delimiter)),
        envelope: cli.envelope.then(EnvelopeConfig::default),
        json: JsonOpts {
            pretty: !cli.compact,
        },
    };
    match cli.cmd {
        Cmd::Get(a) => cmd_get(&ctx, a),
        Cmd::Has(a) => cmd_has(&ctx, a),
        Cmd::Set(a) => cmd_set(&ctx, a),
        Cmd::Forget(a) => cmd_forget(&ctx, a),
        Cmd::Flatten(a) => cmd_flatten(&ctx, a),
        Cmd::Paths(a) => cmd_paths(&ctx, a),
        Cmd::List(a) => cmd_list(&ctx, a),
        Cmd::Where(a) => cmd_where(&ctx, a),
        Cmd::Group(a) => cmd_group(&ctx, a),
        Cmd::Pluck(a) => cmd_pluck(&ctx, a),
        Cmd::Sort(a) => cmd_sort(&ctx, a),
    }
}

fn cmd_get(ctx: &Ctx, args: GetArgs) {
    let v = load(&args.file);
    match ctx.accessor().lookup(&v, &args.path) {
        Some(x) => ctx.print(x.clone()),
        None => match args.default {
            Some(raw) => ctx.print(parse_raw("default", &raw)),
            None => ctx.not_found(&args.path),
        },
    }
}

fn cmd_has(ctx: &Ctx, args: PathArgs) {
    let v = load(&args.file);
    ctx.print(Value::Bool(ctx.accessor().has(&v, &args.path)));
}

fn cmd_set(ctx: &Ctx, args: SetArgs) {
    let mut v = load(&args.file);
    let new_val = parse_raw("value", &args.value);
    ctx.accessor()
        .set(&mut v, &args.path, new_val)
        .unwrap_or_else(|e| fail(4, &format!("error: {}", e)));
    ctx.finish_edit(v, args.out);
}

fn cmd_forget(ctx: &Ctx, args: ForgetArgs) {
    let mut v = load(&args.file);
    let removed = ctx
        .accessor()
        .forget(&mut v, &args.path)
        .unwrap_or_else(|e| fail(4, &format!("error: {}", e)));
    if removed.is_none() {
        tracing::warn!(path = %args.path, "nothing to remove");
    }
    ctx.finish_edit(v, args.out);
}

fn cmd_flatten(ctx: &Ctx, args: FlattenArgs) {
    let v = load(&args.file);
    ctx.print(Value::Array(flatten(&v, args.depth)));
}

fn cmd_paths(ctx: &Ctx, args: FileArgs) {
    let v = load(&args.file);
    let paths = ctx.accessor().paths(&v);
    ctx.print(Value::Array(paths.into_iter().map(Value::String).collect()));
}

fn cmd_list(ctx: &Ctx, args: ListArgs) {
    let v = load(&args.file);
    let Some(children) = ctx.accessor().children(&v, &args.path) else {
        ctx.not_found(&args.path);
    };
    for c in children {
        println!(
            "{}\t{:?}{}",
            c.key_or_index,
            c.kind,
            c.len.map(|n| format!("\t(len={})", n)).unwrap_or_default()
        );
    }
}

fn load_collection(ctx: &Ctx, src: &CollectionArgs) -> Vec<Value> {
    let doc = load(&src.file);
    let node = match &src.at {
        Some(at) => ctx
            .accessor()
            .lookup(&doc, at)
            .cloned()
            .unwrap_or_else(|| ctx.not_found(at)),
        None => doc,
    };
    match node {
        Value::Array(records) => records,
        other => fail(
            3,
            &format!("expected an array of records, found {:?}", dotdata_core::JsonKind::of(&other)),
        ),
    }
}

fn cmd_where(ctx: &Ctx, args: WhereArgs) {
    let records = load_collection(ctx, &args.src);
    let op: Operator = args
        .op
        .parse()
        .unwrap_or_else(|e| fail(3, &format!("error: {}", e)));
    let operand = parse_raw("value", &args.value);
    let kept = ctx.ops.filter_by(&records, &args.path, op, &operand);
    tracing::debug!(total = records.len(), kept = kept.len(), %op, "filtered");
    ctx.print(Value::Array(kept));
}

fn cmd_group(ctx: &Ctx, args: GroupArgs) {
    let records = load_collection(ctx, &args.src);
    let groups = ctx.ops.group_by(&records, Key::Path(&args.key));
    ctx.print(Value::Object(
        groups
            .into_iter()
            .map(|(k, members)| (k, Value::Array(members)))
            .collect(),
    ));
}

fn cmd_pluck(ctx: &Ctx, args: PluckArgs) {
    let records = load_collection(ctx, &args.src);
    ctx.print(ctx.ops.pluck(&records, &args.value, args.key.as_deref()));
}

fn cmd_sort(ctx: &Ctx, args: SortArgs) {
    let records = load_collection(ctx, &args.src);
    let direction: Direction = args
        .direction
        .parse()
        .unwrap_or_else(|e| fail(3, &format!("error: {}", e)));
    ctx.print(Value::Array(ctx.ops.sort_by(&records, Key::Path(&args.key), direction)));
}
