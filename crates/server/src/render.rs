//! Card images.
//!
//! Cards are laid out as SVG documents and rasterized to PNG. External
//! images are fetched once per request and embedded as data URLs.

use std::{
    fmt::{self, Write},
    sync::{Arc, OnceLock},
    time::Duration,
};

use base64::Engine;
use loyalty_sdk::{
    leaderboard::resolve_tier,
    utils::shorten_address,
    Leaderboard, PassData, ProgramDetails,
};
use poem::{http::header, Response};
use resvg::{tiny_skia, usvg};

/// Maximum number of rows drawn on a leaderboard card.
pub const MAX_ROWS: usize = 10;

/// Maximum size of an embedded image.
pub const MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

const IMAGE_TIMEOUT: Duration = Duration::from_secs(5);
const WIDTH: u32 = 800;
const HEADER_HEIGHT: u32 = 160;
const ROW_HEIGHT: u32 = 56;
const FONT: &str = "Inter, Helvetica, Arial, sans-serif";

/// Card rendering error.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Layout error.
    #[error("layout: {0}")]
    Layout(#[from] fmt::Error),
    /// The SVG document was rejected.
    #[error("svg: {0}")]
    Svg(#[from] usvg::Error),
    /// The card has a zero sized canvas.
    #[error("empty canvas")]
    EmptyCanvas,
    /// PNG encoding error.
    #[error("png: {0}")]
    Png(String),
}

/// Optional images of a leaderboard card.
#[derive(Debug, Clone, Default)]
pub struct CardOptions {
    /// Background image URL.
    pub background_image: Option<String>,
    /// Header image URL.
    pub header_image: Option<String>,
    /// Avatar shown for every member.
    pub default_avatar: Option<String>,
}

impl CardOptions {
    /// Replace every image URL by an embedded data URL, dropping images
    /// that cannot be fetched.
    pub async fn embed_images(self, http: &reqwest::Client) -> Self {
        let (background_image, header_image, default_avatar) = futures_util::join!(
            embed(http, self.background_image),
            embed(http, self.header_image),
            embed(http, self.default_avatar),
        );
        Self {
            background_image,
            header_image,
            default_avatar,
        }
    }
}

async fn embed(http: &reqwest::Client, href: Option<String>) -> Option<String> {
    let href = href?;
    match fetch_data_url(http, &href).await {
        Ok(data_url) => Some(data_url),
        Err(err) => {
            tracing::warn!(%href, %err, "skipping card image");
            None
        }
    }
}

async fn fetch_data_url(http: &reqwest::Client, href: &str) -> Result<String, String> {
    let url = url::Url::parse(href).map_err(|err| err.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    let resp = http
        .get(url)
        .timeout(IMAGE_TIMEOUT)
        .send()
        .await
        .and_then(|resp| resp.error_for_status())
        .map_err(|err| err.to_string())?;
    let bytes = resp.bytes().await.map_err(|err| err.to_string())?;
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(format!("image is larger than {MAX_IMAGE_BYTES} bytes"));
    }
    data_url(&bytes).ok_or_else(|| "unsupported image format".to_string())
}

/// Encode raster image bytes as a data URL. Returns `None` unless the bytes
/// are a PNG, JPEG, GIF or WebP image.
pub fn data_url(bytes: &[u8]) -> Option<String> {
    let mime = if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(&[0xff, 0xd8, 0xff]) {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        return None;
    };
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Some(format!("data:{mime};base64,{encoded}"))
}

fn fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded card fonts");
            Arc::new(db)
        })
        .clone()
}

/// Rasterize an SVG card to PNG.
pub fn rasterize(svg: &str) -> Result<Vec<u8>, RenderError> {
    let options = usvg::Options {
        fontdb: fonts(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(svg, &options)?;
    let size = tree.size().to_int_size();
    let mut pixmap =
        tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(RenderError::EmptyCanvas)?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
    pixmap
        .encode_png()
        .map_err(|err| RenderError::Png(err.to_string()))
}

/// Wrap PNG bytes in an uncached image response.
pub fn png_response(png: Vec<u8>) -> Response {
    Response::builder()
        .content_type("image/png")
        .header(header::CACHE_CONTROL, "no-store")
        .body(png)
}

/// Escape text for use in XML content and attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn open(out: &mut String, height: u32, background: Option<&str>) -> fmt::Result {
    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{WIDTH}" height="{height}" viewBox="0 0 {WIDTH} {height}" font-family="{FONT}">"#
    )?;
    write!(
        out,
        r##"<rect width="{WIDTH}" height="{height}" rx="24" fill="#0f172a"/>"##
    )?;
    if let Some(href) = background {
        image(out, href, 0, 0, WIDTH, height, Some("opacity=\"0.35\""))?;
    }
    Ok(())
}

fn image(
    out: &mut String,
    href: &str,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    extra: Option<&str>,
) -> fmt::Result {
    write!(
        out,
        r#"<image href="{}" x="{x}" y="{y}" width="{width}" height="{height}" preserveAspectRatio="xMidYMid slice" {}/>"#,
        escape(href),
        extra.unwrap_or_default()
    )
}

fn text(
    out: &mut String,
    x: u32,
    y: u32,
    size: u32,
    fill: &str,
    anchor: &str,
    content: &str,
) -> fmt::Result {
    write!(
        out,
        r#"<text x="{x}" y="{y}" font-size="{size}" fill="{fill}" text-anchor="{anchor}">{}</text>"#,
        escape(content)
    )
}

fn format_xp(xp: u64) -> String {
    let digits = xp.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, c) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Lay out the top of a leaderboard.
pub fn leaderboard_card(leaderboard: &Leaderboard, options: &CardOptions) -> Result<String, fmt::Error> {
    let rows = leaderboard.members.len().min(MAX_ROWS);
    let height = HEADER_HEIGHT + ROW_HEIGHT * rows.max(1) as u32 + 40;
    let mut out = String::new();
    open(&mut out, height, options.background_image.as_deref())?;

    if let Some(href) = options.header_image.as_deref() {
        image(&mut out, href, 32, 28, 96, 96, None)?;
    }
    let title_x = if options.header_image.is_some() { 148 } else { 32 };
    text(&mut out, title_x, 72, 34, "#f8fafc", "start", &leaderboard.program_name)?;
    text(
        &mut out,
        title_x,
        110,
        18,
        "#94a3b8",
        "start",
        &format!(
            "{} members · {} passes minted",
            leaderboard.total_members, leaderboard.total_minted
        ),
    )?;

    if leaderboard.members.is_empty() {
        text(&mut out, WIDTH / 2, HEADER_HEIGHT + 34, 20, "#94a3b8", "middle", "No members yet")?;
    }

    for (idx, member) in leaderboard.members.iter().take(MAX_ROWS).enumerate() {
        let top = HEADER_HEIGHT + ROW_HEIGHT * idx as u32;
        let baseline = top + 34;
        let fill = if idx % 2 == 0 { "#1e293b" } else { "#172033" };
        write!(
            out,
            r#"<rect x="24" y="{top}" width="{}" height="{}" rx="12" fill="{fill}"/>"#,
            WIDTH - 48,
            ROW_HEIGHT - 6
        )?;
        let rank_fill = match member.rank {
            1 => "#facc15",
            2 => "#e2e8f0",
            3 => "#f59e0b",
            _ => "#cbd5e1",
        };
        text(&mut out, 64, baseline, 22, rank_fill, "middle", &format!("#{}", member.rank))?;
        if let Some(href) = options.default_avatar.as_deref() {
            image(&mut out, href, 96, top + 7, 36, 36, None)?;
        }
        text(
            &mut out,
            148,
            baseline,
            20,
            "#f8fafc",
            "start",
            &shorten_address(&member.address),
        )?;
        text(&mut out, 520, baseline, 18, "#a5b4fc", "middle", &member.current_tier)?;
        text(
            &mut out,
            WIDTH - 48,
            baseline,
            20,
            "#f8fafc",
            "end",
            &format!("{} XP", format_xp(member.total_xp)),
        )?;
    }

    out.push_str("</svg>");
    Ok(out)
}

/// Lay out a pass card.
pub fn pass_card(address: &str, pass: &PassData) -> Result<String, fmt::Error> {
    let mut out = String::new();
    open(&mut out, 280, None)?;

    let tier = if pass.reward_tiers.is_empty() {
        pass.current_tier.clone()
    } else {
        resolve_tier(pass.xp, &pass.reward_tiers).current_tier
    };
    let title = pass.name.as_deref().unwrap_or("Loyalty Pass");
    text(&mut out, 40, 72, 32, "#f8fafc", "start", title)?;
    text(&mut out, 40, 108, 18, "#94a3b8", "start", &shorten_address(address))?;
    text(&mut out, 40, 180, 48, "#f8fafc", "start", &format!("{} XP", format_xp(pass.xp)))?;
    text(&mut out, WIDTH - 40, 180, 28, "#a5b4fc", "end", &tier)?;
    if let Some(last_action) = pass.last_action.as_deref() {
        text(
            &mut out,
            40,
            236,
            16,
            "#64748b",
            "start",
            &format!("Last action {last_action}"),
        )?;
    }

    out.push_str("</svg>");
    Ok(out)
}

/// Lay out a program card with its tier roster.
pub fn program_card(address: &str, program: &ProgramDetails) -> Result<String, fmt::Error> {
    let rows = program.reward_tiers.len() as u32;
    let height = 150 + rows * 44 + 24;
    let mut out = String::new();
    open(&mut out, height, None)?;

    text(&mut out, 40, 72, 32, "#f8fafc", "start", &program.name)?;
    text(&mut out, 40, 108, 18, "#94a3b8", "start", &shorten_address(address))?;
    for (idx, tier) in program.reward_tiers.iter().enumerate() {
        let baseline = 160 + idx as u32 * 44;
        text(&mut out, 40, baseline, 20, "#a5b4fc", "start", &tier.name)?;
        text(
            &mut out,
            WIDTH - 40,
            baseline,
            20,
            "#f8fafc",
            "end",
            &format!("{} XP", format_xp(tier.xp_required)),
        )?;
    }

    out.push_str("</svg>");
    Ok(out)
}
