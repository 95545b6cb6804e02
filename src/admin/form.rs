use folio_schema::ProjectFields;
use serde::Deserialize;
use std::fmt;

/// Text inputs of the editor form, as submitted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tech_stack: String,
    #[serde(default)]
    pub launched_on: String,
    #[serde(default)]
    pub cta_url: String,
    /// Checkbox: present when ticked, whatever its value.
    #[serde(default)]
    pub is_featured: Option<String>,
}

impl ProjectForm {
    /// Stores a named text input. Returns `false` for names the editor does not have.
    pub fn set(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "summary" => &mut self.summary,
            "tech_stack" => &mut self.tech_stack,
            "launched_on" => &mut self.launched_on,
            "cta_url" => &mut self.cta_url,
            "is_featured" => {
                self.is_featured = Some(value);
                return true;
            }
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Trimmed fields; empty inputs become `None`.
    pub fn into_fields(self) -> ProjectFields {
        fn text(value: String) -> Option<String> {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }

        ProjectFields {
            title: text(self.title),
            summary: text(self.summary),
            tech_stack: text(self.tech_stack),
            launched_on: text(self.launched_on),
            cta_url: text(self.cta_url),
            is_featured: self.is_featured.is_some(),
        }
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

impl DeleteForm {
    pub fn confirmed(&self) -> bool {
        self.confirm.as_deref() == Some("yes")
    }
}
