use log::{debug, error, info, warn};

use participant_ranking::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use text_diff::print_diff;

use crate::args::RenderArgs;
use crate::page::config_reader::*;
use crate::page::io_feed::*;
use crate::page::template::*;

pub mod config_reader;
pub mod io_feed;
pub mod template;

pub const DEFAULT_FEED: &str = "public/data/fazenda.json";
pub const DEFAULT_TEMPLATE: &str = "public/index.html";
pub const DEFAULT_CONTAINER_CLASS: &str = "participants-container";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PageError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Cannot find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Unknown locale {locale:?} (expected en or pt)"))]
    UnknownLocale { locale: String },

    #[snafu(display("Error reading feed {path}"))]
    FeedRead {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error requesting feed {url}"))]
    FeedRequest { source: reqwest::Error, url: String },
    #[snafu(display("Feed {url} answered with status {status}"))]
    FeedStatus { url: String, status: u16 },
    #[snafu(display("Error parsing feed {location}"))]
    ParsingFeed {
        source: serde_json::Error,
        #[snafu(implicit(false))]
        location: String,
    },

    #[snafu(display("No element with class {class:?} in the page template {path}"))]
    MissingContainer { class: String, path: String },
    #[snafu(display("Error writing file {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between the rendered page and the reference page {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(display("Error listening on {address}"))]
    Binding {
        source: std::io::Error,
        address: String,
    },
    #[snafu(display("Static server failed"))]
    Serving { source: std::io::Error },
}

pub type PageResult<T> = Result<T, PageError>;

/// Where the cards of a page load end up.
pub trait RenderTarget {
    fn append(&mut self, card: &ParticipantCard);
}

impl RenderTarget for Vec<ParticipantCard> {
    fn append(&mut self, card: &ParticipantCard) {
        self.push(card.clone());
    }
}

/// How the cards are ranked and labeled.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CardSettings {
    /// The name of the vote field. Unknown names keep the feed order.
    pub criterion: String,
    pub labels: CardLabels,
}

impl Default for CardSettings {
    fn default() -> Self {
        CardSettings {
            criterion: SortCriterion::default().to_string(),
            labels: CardLabels::default(),
        }
    }
}

/// The outcome of a page load.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum PageLoad {
    /// The feed was read and this many cards were appended.
    Rendered(usize),
    /// The feed could not be read. Nothing was appended.
    FeedUnavailable,
}

/// Ranks the records and builds their cards, in ranked order.
pub fn render_cards(records: &[ParticipantRecord], settings: &CardSettings) -> Vec<ParticipantCard> {
    let ranked = assign_positions(rank_by_field(records, &settings.criterion));
    build_cards(&ranked, &settings.labels)
}

/// Fetches the feed once and appends one card per participant to `target`.
///
/// A feed that cannot be fetched is only logged: `target` is left as it was.
pub async fn load_page<T: RenderTarget>(
    feed: &FeedSource,
    settings: &CardSettings,
    target: &mut T,
) -> PageLoad {
    let records = match fetch_feed(feed).await {
        Ok(f) => f.data,
        Err(e) => {
            error!("Feed unavailable: {}", error_chain(&e));
            return PageLoad::FeedUnavailable;
        }
    };
    let cards = render_cards(&records, settings);
    for card in cards.iter() {
        target.append(card);
    }
    info!("Appended {} cards", cards.len());
    PageLoad::Rendered(cards.len())
}

/// The fully resolved options of the render command.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RenderSettings {
    pub feed: FeedSource,
    pub template: PathBuf,
    pub container_class: String,
    pub cards: CardSettings,
    /// None for the standard output.
    pub output: Option<PathBuf>,
    pub reference: Option<PathBuf>,
}

impl RenderSettings {
    /// Command-line values win over the configuration. Paths given on the
    /// command line are relative to the current directory, the ones in the
    /// configuration file to the directory of that file.
    pub fn resolve(args: &RenderArgs, loaded: &LoadedConfig) -> PageResult<RenderSettings> {
        let config = &loaded.config;
        let feed = match (&args.feed, &config.feed) {
            (Some(f), _) => FeedSource::resolve(f, Path::new(".")),
            (None, Some(f)) => FeedSource::resolve(f, &loaded.root),
            (None, None) => FeedSource::resolve(DEFAULT_FEED, &loaded.root),
        };
        let template = match (&args.template, &config.template) {
            (Some(t), _) => PathBuf::from(t),
            (None, Some(t)) => loaded.resolve(t),
            (None, None) => loaded.resolve(DEFAULT_TEMPLATE),
        };
        let output = match (&args.out, config.output_path()) {
            (Some(o), _) if o == "stdout" || o.is_empty() => None,
            (Some(o), _) => Some(PathBuf::from(o)),
            (None, Some(o)) => Some(loaded.resolve(&o)),
            (None, None) => None,
        };
        let criterion = args
            .criterion
            .clone()
            .or_else(|| config.criterion.clone())
            .unwrap_or_else(|| SortCriterion::default().to_string());
        Ok(RenderSettings {
            feed,
            template,
            container_class: config
                .container_class
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTAINER_CLASS.to_string()),
            cards: CardSettings {
                criterion,
                labels: config.card_labels(args.locale.as_deref())?,
            },
            output,
            reference: args.reference.as_ref().map(PathBuf::from),
        })
    }
}

/// Runs the render command: one page load into the template, then writes the page.
pub async fn run_render(args: &RenderArgs, config_path: Option<&str>) -> PageResult<PageLoad> {
    let loaded = load_config(config_path)?;
    let settings = RenderSettings::resolve(args, &loaded)?;
    info!("settings: {:?}", settings);
    render_page(&settings).await
}

pub async fn render_page(settings: &RenderSettings) -> PageResult<PageLoad> {
    let template_path = settings.template.display().to_string();
    let html = fs::read_to_string(&settings.template).context(OpeningFileSnafu {
        path: template_path.clone(),
    })?;
    let mut page = PageTemplate::parse(html, &settings.container_class).context(
        MissingContainerSnafu {
            class: settings.container_class.clone(),
            path: template_path,
        },
    )?;

    let outcome = load_page(&settings.feed, &settings.cards, &mut page).await;
    let rendered = page.into_html();

    write_page(settings.output.as_deref(), &rendered)?;

    // The reference page, if provided for comparison
    if let Some(reference_p) = settings.reference.as_ref() {
        let path = reference_p.display().to_string();
        let reference = read_reference(&path)?;
        if reference != rendered {
            warn!("Found differences with the reference page");
            print_diff(reference.as_str(), rendered.as_str(), "\n");
            return ReferenceMismatchSnafu { path }.fail();
        }
        info!("Rendered page matches the reference {}", path);
    }
    Ok(outcome)
}

fn write_page(output: Option<&Path>, html: &str) -> PageResult<()> {
    match output {
        None => {
            print!("{}", html);
            Ok(())
        }
        Some(p) => {
            let path = p.display().to_string();
            if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).context(WritingFileSnafu { path: path.clone() })?;
            }
            fs::write(p, html).context(WritingFileSnafu { path: path.clone() })?;
            info!("Wrote page {}", path);
            Ok(())
        }
    }
}

/// The error and all its causes, on one line.
pub fn error_chain(e: &dyn std::error::Error) -> String {
    let mut msg = e.to_string();
    let mut cur = e.source();
    while let Some(cause) = cur {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        cur = cause.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    const TEMPLATE: &str = "<html><body><section class=\"participants-container\"></section></body></html>\n";

    const FEED: &str = r#"{"data": [
        {"name": "Ana", "picture": "ana.jpg", "description": "Desc 1", "positive": 100, "negative": 50},
        {"name": "Bruno", "picture": "bruno.jpg", "description": "Desc 2", "positive": "200", "negative": 30},
        {"name": "Carlos", "picture": "carlos.jpg", "description": "Desc 3", "positive": 150, "negative": 80},
        {"name": "Diana", "picture": "diana.jpg", "description": "Desc 4", "positive": null}
    ]}"#;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn site(feed: &str) -> TempDir {
        let tmp = tempdir().unwrap();
        let dir = tmp.path();
        fs::create_dir_all(dir.join("data")).unwrap();
        fs::write(dir.join("index.html"), TEMPLATE).unwrap();
        fs::write(dir.join("data/fazenda.json"), feed).unwrap();
        tmp
    }

    fn settings(dir: &Path) -> RenderSettings {
        RenderSettings {
            feed: FeedSource::Local(dir.join("data/fazenda.json")),
            template: dir.join("index.html"),
            container_class: DEFAULT_CONTAINER_CLASS.to_string(),
            cards: CardSettings::default(),
            output: Some(dir.join("dist/index.html")),
            reference: None,
        }
    }

    fn headings(html: &str) -> Vec<String> {
        html.split("<h2>")
            .skip(1)
            .map(|s| s.split("</h2>").next().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn render_cards_in_ranked_order() {
        let feed: Feed = serde_json::from_str(FEED).unwrap();
        let cards = render_cards(&feed.data, &CardSettings::default());
        let names: Vec<&str> = cards.iter().map(|c| c.heading.as_str()).collect();
        assert_eq!(names, vec!["Bruno", "Carlos", "Ana", "Diana"]);
        let positions: Vec<u32> = cards.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![1, 2, 3, 4]);
        assert_eq!(cards[3].positive.percentage, 0);
        assert_eq!(cards[3].negative.percentage, 0);
    }

    #[test]
    fn render_cards_with_unknown_criterion() {
        let feed: Feed = serde_json::from_str(FEED).unwrap();
        let settings = CardSettings {
            criterion: "likes".to_string(),
            ..Default::default()
        };
        let cards = render_cards(&feed.data, &settings);
        let names: Vec<&str> = cards.iter().map(|c| c.heading.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bruno", "Carlos", "Diana"]);
    }

    #[tokio::test]
    async fn load_page_appends_cards() {
        init_logger();
        let tmp = site(FEED);
        let dir = tmp.path();
        let mut cards: Vec<ParticipantCard> = Vec::new();
        let outcome = load_page(
            &FeedSource::Local(dir.join("data/fazenda.json")),
            &CardSettings::default(),
            &mut cards,
        )
        .await;
        assert_eq!(outcome, PageLoad::Rendered(4));
        assert_eq!(cards[0].heading, "Bruno");
        assert_eq!(cards[0].image.alt, "Photo of Bruno");
    }

    #[tokio::test]
    async fn load_page_with_empty_feed() {
        let tmp = site(r#"{"data": []}"#);
        let dir = tmp.path();
        let mut cards: Vec<ParticipantCard> = Vec::new();
        let outcome = load_page(
            &FeedSource::Local(dir.join("data/fazenda.json")),
            &CardSettings::default(),
            &mut cards,
        )
        .await;
        assert_eq!(outcome, PageLoad::Rendered(0));
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn load_page_without_feed_leaves_target_alone() {
        init_logger();
        let tmp = site(FEED);
        let dir = tmp.path();
        let mut cards: Vec<ParticipantCard> = Vec::new();
        let outcome = load_page(
            &FeedSource::Local(dir.join("data/missing.json")),
            &CardSettings::default(),
            &mut cards,
        )
        .await;
        assert_eq!(outcome, PageLoad::FeedUnavailable);
        assert!(cards.is_empty());
    }

    #[tokio::test]
    async fn render_page_writes_output() {
        let tmp = site(FEED);
        let dir = tmp.path();
        let s = settings(dir);
        let outcome = render_page(&s).await.unwrap();
        assert_eq!(outcome, PageLoad::Rendered(4));

        let html = fs::read_to_string(dir.join("dist/index.html")).unwrap();
        assert_eq!(headings(&html), vec!["Bruno", "Carlos", "Ana", "Diana"]);
        assert!(html.starts_with("<html><body><section class=\"participants-container\"><article"));
        assert!(html.ends_with("</article>\n</section></body></html>\n"));
    }

    #[tokio::test]
    async fn site_is_removed_after_render() {
        let tmp = site(FEED);
        let dir = tmp.path().to_path_buf();
        render_page(&settings(&dir)).await.unwrap();
        assert!(dir.join("dist/index.html").is_file());
        drop(tmp);
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn render_page_without_feed_keeps_template() {
        init_logger();
        let tmp = site("not json");
        let dir = tmp.path();
        let s = settings(dir);
        let outcome = render_page(&s).await.unwrap();
        assert_eq!(outcome, PageLoad::FeedUnavailable);
        let html = fs::read_to_string(dir.join("dist/index.html")).unwrap();
        assert_eq!(html, TEMPLATE);
    }

    #[tokio::test]
    async fn render_page_missing_container() {
        let tmp = site(FEED);
        let dir = tmp.path();
        let mut s = settings(dir);
        s.container_class = "cards".to_string();
        let err = render_page(&s).await.unwrap_err();
        assert!(matches!(err, PageError::MissingContainer { .. }));
    }

    #[tokio::test]
    async fn render_page_against_reference() {
        let tmp = site(FEED);
        let dir = tmp.path();
        let mut s = settings(dir);
        render_page(&s).await.unwrap();

        // Same inputs, same page.
        let reference = dir.join("reference.html");
        fs::copy(dir.join("dist/index.html"), &reference).unwrap();
        s.reference = Some(reference.clone());
        assert_eq!(render_page(&s).await.unwrap(), PageLoad::Rendered(4));

        // A different ranking is reported.
        s.cards.criterion = "negative".to_string();
        let err = render_page(&s).await.unwrap_err();
        assert!(matches!(err, PageError::ReferenceMismatch { .. }));
    }

    #[test]
    fn resolve_settings_from_config_and_flags() {
        let loaded = LoadedConfig {
            config: PageConfig {
                feed: Some("data/fazenda.json".to_string()),
                template: Some("index.html".to_string()),
                criterion: Some("negative".to_string()),
                locale: Some("pt".to_string()),
                output_settings: Some(OutputSettings {
                    output_path: Some("dist/index.html".to_string()),
                }),
                ..Default::default()
            },
            root: PathBuf::from("site"),
        };
        let args = RenderArgs {
            feed: None,
            template: None,
            out: None,
            reference: None,
            criterion: None,
            locale: None,
        };
        let s = RenderSettings::resolve(&args, &loaded).unwrap();
        assert_eq!(s.feed, FeedSource::Local(PathBuf::from("site/data/fazenda.json")));
        assert_eq!(s.template, PathBuf::from("site/index.html"));
        assert_eq!(s.output, Some(PathBuf::from("site/dist/index.html")));
        assert_eq!(s.container_class, DEFAULT_CONTAINER_CLASS);
        assert_eq!(s.cards.criterion, "negative");
        assert_eq!(s.cards.labels, CardLabels::portuguese());

        let args = RenderArgs {
            feed: Some("http://localhost:7007/data/fazenda.json".to_string()),
            template: Some("other.html".to_string()),
            out: Some("stdout".to_string()),
            reference: Some("ref.html".to_string()),
            criterion: Some("positive".to_string()),
            locale: Some("en".to_string()),
        };
        let s = RenderSettings::resolve(&args, &loaded).unwrap();
        assert_eq!(
            s.feed,
            FeedSource::Remote("http://localhost:7007/data/fazenda.json".to_string())
        );
        assert_eq!(s.template, PathBuf::from("other.html"));
        assert_eq!(s.output, None);
        assert_eq!(s.reference, Some(PathBuf::from("ref.html")));
        assert_eq!(s.cards.criterion, "positive");
        assert_eq!(s.cards.labels, CardLabels::english());
    }

    #[test]
    fn error_chain_lists_causes() {
        let e = fs::read_to_string("/definitely/not/here/index.html")
            .context(OpeningFileSnafu {
                path: "index.html",
            })
            .unwrap_err();
        let msg = error_chain(&e);
        assert!(msg.starts_with("Error opening file index.html: "));
        assert!(msg.len() > "Error opening file index.html: ".len());
    }
}
