//! Kestrel CLI
//!
//! A headless inspector for the render core: prints tokens, the document
//! tree, the author stylesheet, computed styles, the box tree or the display
//! list for a file, URL or inline markup.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use kestrel_browser::{Cancellation, Document, DocumentBuilder, EngineConfig, HttpFetcher};
use kestrel_common::url::normalize_url;
use kestrel_css::{Color, DisplayList, PaintCommand, Viewport};
use kestrel_dom::{DomTree, NodeId};
use kestrel_html::{print_tree, tokenize};
use owo_colors::OwoColorize;

/// Kestrel: inspect how the render core sees a page
#[derive(Parser, Debug)]
#[command(name = "kestrel")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Display list for a local file
    kestrel ./index.html

    # Box tree for a site at a narrow width
    kestrel --layout --width 480 example.com

    # Computed styles of inline markup as JSON
    kestrel --styles --json --html '<p style="color:red">x</p>'

    # Which node is under a point, 300px down the page
    kestrel --hit 40,20 --scroll 300 ./index.html
"#)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to an HTML file or a URL
    #[arg(value_name = "FILE|URL")]
    path: Option<String>,

    /// Use this markup instead of a file or URL
    #[arg(long, value_name = "HTML", conflicts_with = "path")]
    html: Option<String>,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 800.0)]
    height: f32,

    /// Vertical scroll offset in pixels
    #[arg(long, default_value_t = 0.0)]
    scroll: f32,

    /// Engine config as JSON; takes precedence over the viewport and fetch flags
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Do not fetch `<link rel=stylesheet>` targets
    #[arg(long)]
    no_external_css: bool,

    /// Maximum simultaneous fetches
    #[arg(long, default_value_t = 6)]
    max_fetches: usize,

    /// Print the tokenizer output
    #[arg(long)]
    tokens: bool,

    /// Print the document tree
    #[arg(long)]
    tree: bool,

    /// Print the parsed author stylesheet
    #[arg(long)]
    css: bool,

    /// Print the computed style of every element
    #[arg(long)]
    styles: bool,

    /// Print the laid-out box tree
    #[arg(long)]
    layout: bool,

    /// Print the display list (the default)
    #[arg(long)]
    display_list: bool,

    /// Emit JSON instead of text for styles, layout and the display list
    #[arg(long)]
    json: bool,

    /// Print the node under viewport point X,Y
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    hit: Option<(f32, f32)>,

    /// Log pipeline stages at debug level
    #[arg(short, long)]
    verbose: bool,
}

/// What to print. Earlier variants win when several flags are given, except
/// that `--display-list` always wins.
#[derive(Debug, Clone, Copy)]
enum Mode {
    Tokens,
    Tree,
    Css,
    Styles,
    Hit(f32, f32),
    Layout,
    DisplayList,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.display_list {
            Mode::DisplayList
        } else if self.tokens {
            Mode::Tokens
        } else if self.tree {
            Mode::Tree
        } else if self.css {
            Mode::Css
        } else if self.styles {
            Mode::Styles
        } else if let Some((x, y)) = self.hit {
            Mode::Hit(x, y)
        } else if self.layout {
            Mode::Layout
        } else {
            Mode::DisplayList
        }
    }

    fn engine_config(&self) -> Result<EngineConfig> {
        if let Some(ref path) = self.config {
            return EngineConfig::from_json_file(path)
                .with_context(|| format!("failed to load config '{path}'"));
        }
        Ok(EngineConfig {
            viewport_width: self.width,
            viewport_height: self.height,
            max_concurrent_fetches: self.max_fetches,
            fetch_external_stylesheets: !self.no_external_css,
            ..EngineConfig::default()
        })
    }
}

fn parse_point(input: &str) -> Result<(f32, f32), String> {
    let (x, y) = input
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{input}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad X '{x}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad Y '{y}': {e}"))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(run(&cli))
}

async fn run(cli: &Cli) -> Result<()> {
    let config = cli.engine_config()?;
    let fetcher = HttpFetcher::new(&config).context("failed to create HTTP client")?;
    let builder = DocumentBuilder::new(fetcher.clone(), config.clone());
    let cancel = Cancellation::new();

    let (html, base_url) = load_source(cli, &builder, &fetcher, &cancel).await?;
    let mode = cli.mode();

    if matches!(mode, Mode::Tokens) {
        for token in tokenize(&html) {
            println!("{} {token:?}", token.to_string().cyan());
        }
        return Ok(());
    }

    let document = builder
        .build(&html, base_url.as_deref(), &cancel)
        .await
        .context("failed to build document")?;

    match mode {
        Mode::Tree => {
            print!("{}", print_tree(document.tree(), NodeId::ROOT, 0));
            return Ok(());
        }
        Mode::Css => {
            print!("{}", document.stylesheet().print_tree());
            return Ok(());
        }
        Mode::Styles => return print_styles(&document, cli.json),
        _ => {}
    }

    let viewport = Viewport::new(config.viewport_width, config.viewport_height)
        .with_scroll(cli.scroll);
    let result = document.layout(&viewport);

    match mode {
        Mode::Hit(x, y) => match result.display_list.find_element_at(x, y, cli.scroll) {
            Some(node) => println!("{}", describe_node(document.tree(), node)),
            None => println!("{}", "nothing at that point".dimmed()),
        },
        Mode::Layout => {
            let Some(ref root) = result.root else {
                bail!("document produced no boxes");
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(root)?);
            } else {
                print!("{}", root.dump());
            }
        }
        _ if cli.json => println!("{}", serde_json::to_string_pretty(&result.display_list)?),
        _ => print_display_list(document.tree(), &result.display_list),
    }
    Ok(())
}

/// Read or fetch the markup, returning it with the URL relative links resolve against.
async fn load_source(
    cli: &Cli,
    builder: &DocumentBuilder<HttpFetcher>,
    fetcher: &HttpFetcher,
    cancel: &Cancellation,
) -> Result<(String, Option<String>)> {
    if let Some(ref html) = cli.html {
        return Ok((html.clone(), None));
    }
    let Some(ref path) = cli.path else {
        bail!("nothing to load: give a file, a URL or --html");
    };

    if Path::new(path).exists() {
        let html =
            std::fs::read_to_string(path).with_context(|| format!("failed to read '{path}'"))?;
        let absolute = std::fs::canonicalize(path)
            .with_context(|| format!("failed to resolve '{path}'"))?;
        return Ok((html, Some(format!("file://{}", absolute.display()))));
    }

    let url = normalize_url(path).with_context(|| format!("'{path}' is not a file or URL"))?;
    log::info!("fetching {url}");
    let html = builder
        .limiter()
        .fetch(fetcher, &url, cancel)
        .await
        .with_context(|| format!("failed to fetch {url}"))?;
    Ok((html, Some(url)))
}

fn print_styles(document: &Document, json: bool) -> Result<()> {
    let tree = document.tree();
    let styles = document.styles();

    if json {
        let by_node: BTreeMap<usize, _> = styles.iter().map(|(id, style)| (id.0, style)).collect();
        println!("{}", serde_json::to_string_pretty(&by_node)?);
        return Ok(());
    }

    for id in tree.descendants(NodeId::ROOT) {
        let Some(style) = styles.get(&id) else {
            continue;
        };
        println!("{}", describe_node(tree, id).green());
        for (property, value) in &style.properties {
            let marker = if style.is_important(property) {
                " !important"
            } else {
                ""
            };
            println!("  {}: {value}{}", property.cyan(), marker.yellow());
        }
    }
    Ok(())
}

fn print_display_list(tree: &DomTree, list: &DisplayList) {
    println!(
        "{} {} commands, page height {:.1}px",
        "Display list:".bold(),
        list.len(),
        list.height()
    );
    for command in list.commands() {
        let owner = command
            .node()
            .map(|node| describe_node(tree, node))
            .unwrap_or_default();
        match command {
            PaintCommand::Text {
                x,
                y,
                text,
                font_size,
                color,
                ..
            } => println!(
                "{} ({x:.1}, {y:.1}) {font_size}px {} {text:?} {}",
                "text".green(),
                hex(*color),
                owner.dimmed()
            ),
            PaintCommand::Rect { rect, color, .. } => println!(
                "{} ({:.1}, {:.1}) {:.1}x{:.1} {} {}",
                "rect".blue(),
                rect.x,
                rect.y,
                rect.width,
                rect.height,
                hex(*color),
                owner.dimmed()
            ),
            PaintCommand::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
                ..
            } => println!(
                "{} ({x1:.1}, {y1:.1}) -> ({x2:.1}, {y2:.1}) {width}px {} {}",
                "line".magenta(),
                hex(*color),
                owner.dimmed()
            ),
        }
    }
}

fn hex(color: Color) -> String {
    if color.a == 255 {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    } else {
        format!("#{:02x}{:02x}{:02x}{:02x}", color.r, color.g, color.b, color.a)
    }
}

/// `<tag#id.class>` for elements, a quoted excerpt for text.
fn describe_node(tree: &DomTree, id: NodeId) -> String {
    if let Some(element) = tree.as_element(id) {
        let mut out = format!("<{}", element.tag_name);
        if let Some(el_id) = element.id() {
            out.push('#');
            out.push_str(el_id);
        }
        let mut classes: Vec<&str> = element.classes().into_iter().collect();
        classes.sort_unstable();
        for class in classes {
            out.push('.');
            out.push_str(class);
        }
        out.push('>');
        return out;
    }
    if let Some(text) = tree.as_text(id) {
        let excerpt: String = text.trim().chars().take(24).collect();
        return format!("#text {excerpt:?}");
    }
    format!("node {}", id.0)
}
