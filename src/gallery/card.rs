use super::{DEFAULT_GALLERY_INTERVAL_MS, NO_PREVIEW, UNTITLED_PROJECT};
use crate::html::escape;
use crate::media::MAX_GALLERY_IMAGES;
use folio_schema::{ProjectRow, non_empty};

/// Everything a public project card shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectCard {
    pub title: String,
    /// Public image URLs in display order; empty means the placeholder is shown.
    pub images: Vec<String>,
    pub cta_url: Option<String>,
    pub tech_stack: Option<String>,
    pub launched_on: Option<String>,
    pub gallery_interval: u64,
}

/// Image strip of a card: resolved gallery images, else the thumbnail, else nothing.
pub fn card_images(row: &ProjectRow, public_url: impl Fn(&str) -> Option<String>) -> Vec<String> {
    let gallery: Vec<String> = row
        .gallery_urls
        .iter()
        .filter_map(|path| public_url(path))
        .take(MAX_GALLERY_IMAGES)
        .collect();
    if !row.gallery_urls.is_empty() {
        return gallery;
    }
    row.thumbnail_url
        .as_deref()
        .and_then(public_url)
        .into_iter()
        .collect()
}

impl ProjectCard {
    pub fn from_row(row: &ProjectRow, public_url: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            title: row.title_or(UNTITLED_PROJECT).to_string(),
            images: card_images(row, public_url),
            cta_url: non_empty(row.cta_url.as_ref()).map(str::to_string),
            tech_stack: non_empty(row.tech_stack.as_ref()).map(str::to_string),
            launched_on: non_empty(row.launched_on.as_ref()).map(str::to_string),
            gallery_interval: row.gallery_interval.unwrap_or(DEFAULT_GALLERY_INTERVAL_MS),
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("<article class=\"project-card\" data-draggable>\n");

        let interval = self.gallery_interval;
        match &self.cta_url {
            Some(url) => out.push_str(&format!(
                "<a class=\"project-card__thumb\" data-gallery-interval=\"{interval}\" \
                 href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">\n",
                escape(url)
            )),
            None => out.push_str(&format!(
                "<div class=\"project-card__thumb\" data-gallery-interval=\"{interval}\">\n"
            )),
        }

        if self.images.is_empty() {
            out.push_str(&format!(
                "<div class=\"project-card__thumb-placeholder\">{NO_PREVIEW}</div>\n"
            ));
        }
        for (index, url) in self.images.iter().enumerate() {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{} preview {}\" loading=\"lazy\">\n",
                escape(url),
                escape(&self.title),
                index + 1
            ));
        }
        out.push_str(if self.cta_url.is_some() {
            "</a>\n"
        } else {
            "</div>\n"
        });

        out.push_str("<div class=\"project-card__body\">\n");
        out.push_str(&format!("<h3>{}</h3>\n", escape(&self.title)));
        out.push_str("<div class=\"project-card__meta\">");
        if let Some(tech) = &self.tech_stack {
            out.push_str(&format!(
                "<span class=\"project-card__meta-channel\">{}</span>",
                escape(tech)
            ));
        }
        if let Some(date) = &self.launched_on {
            out.push_str(&format!(
                "<span class=\"project-card__meta-date\">{}</span>",
                escape(date)
            ));
        }
        out.push_str("</div>\n</div>\n</article>\n");
        out
    }
}
