use super::{
    GalleryEvent, LOAD_FAILED, Mount, NO_PROJECTS, ProjectCard, Section, select_featured,
};
use crate::gateway::Backend;
use crate::html::{document, escape};
use folio_schema::ProjectRow;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error};

const EVENT_CAPACITY: usize = 64;

/// Rendered mounts of one public page load.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryPage {
    pub featured: Option<Section>,
    pub all: Option<Section>,
}

impl GalleryPage {
    pub fn section(&self, mount: Mount) -> Option<&Section> {
        match mount {
            Mount::Featured => self.featured.as_ref(),
            Mount::All => self.all.as_ref(),
        }
    }

    fn set(&mut self, mount: Mount, section: Section) {
        match mount {
            Mount::Featured => self.featured = Some(section),
            Mount::All => self.all = Some(section),
        }
    }

    pub fn render(&self) -> String {
        let mut body = String::from("<main class=\"projects-page\">\n");
        if let Some(section) = &self.featured {
            body.push_str("<h2>Featured projects</h2>\n");
            body.push_str(&render_section(Mount::Featured, section));
        }
        if let Some(section) = &self.all {
            body.push_str("<h2>All projects</h2>\n");
            body.push_str(&render_section(Mount::All, section));
        }
        body.push_str("</main>");
        document("Projects", &body)
    }
}

fn render_section(mount: Mount, section: &Section) -> String {
    let mut out = format!(
        "<section class=\"projects\" data-projects-{}>\n",
        mount.as_str()
    );
    match section {
        Section::Cards(cards) => {
            for card in cards {
                out.push_str(&card.render());
            }
        }
        Section::Empty(message) => out.push_str(&format!(
            "<div class=\"projects__empty\">{}</div>\n",
            escape(message)
        )),
    }
    out.push_str("</section>\n");
    out
}

/// Read-only renderer of the public project mounts.
pub struct GalleryRenderer {
    backend: Arc<dyn Backend>,
    events: broadcast::Sender<GalleryEvent>,
}

impl GalleryRenderer {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { backend, events }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: GalleryEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    /// Fetches every project once and renders the requested mounts.
    ///
    /// With no mounts nothing is fetched. A failed fetch renders the generic failure text into
    /// every mount and emits no events.
    pub async fn hydrate(&self, mounts: &[Mount]) -> GalleryPage {
        let mut page = GalleryPage::default();
        if mounts.is_empty() {
            return page;
        }

        let rows = match self.backend.list_projects().await {
            Ok(rows) => rows,
            Err(err) => {
                error!(error = %err, "Failed to fetch projects");
                for &mount in mounts {
                    page.set(mount, Section::Empty(LOAD_FAILED));
                }
                return page;
            }
        };

        for &mount in mounts {
            let selected: Vec<&ProjectRow> = match mount {
                Mount::Featured => select_featured(&rows),
                Mount::All => rows.iter().collect(),
            };
            let section = self.render_mount(mount, &selected);
            page.set(mount, section);
        }
        page
    }

    fn render_mount(&self, mount: Mount, rows: &[&ProjectRow]) -> Section {
        if rows.is_empty() {
            self.emit(GalleryEvent::ProjectsRendered(mount));
            return Section::Empty(NO_PROJECTS);
        }

        let cards: Vec<ProjectCard> = rows
            .iter()
            .map(|row| ProjectCard::from_row(row, |path| self.backend.public_url(path)))
            .collect();
        debug!(mount = mount.as_str(), cards = cards.len(), "Mount rendered");

        self.emit(GalleryEvent::GalleriesReady(mount));
        self.emit(GalleryEvent::ProjectsRendered(mount));
        Section::Cards(cards)
    }
}
