//! The assembled portal page.
//!
//! [`PortalPage`] wires the static chrome and the two parameter blocks into
//! the section layout the engine walks. It is the [`PageSource`] handed to
//! a `PageStream` for one render pass.

use confportal_core::{PageSource, SectionRenderer, SectionStep};

use crate::form::GroupRenderer;
use crate::params::{escape_html, ParameterGroup};
use crate::provider::{DefaultHtmlProvider, HtmlFormatProvider};

/// Page definition: chrome provider, title, version footer, optional update
/// link and the system/custom parameter blocks.
pub struct PortalPage<P: HtmlFormatProvider = DefaultHtmlProvider> {
    provider: P,
    title: String,
    config_version: String,
    update_path: Option<String>,
    system: GroupRenderer,
    custom: GroupRenderer,
}

impl PortalPage<DefaultHtmlProvider> {
    /// Page with the stock chrome.
    pub fn new(title: &str) -> Self {
        Self::with_provider(DefaultHtmlProvider, title)
    }
}

impl<P: HtmlFormatProvider> PortalPage<P> {
    pub fn with_provider(provider: P, title: &str) -> Self {
        Self {
            provider,
            title: title.to_string(),
            config_version: String::new(),
            update_path: None,
            system: GroupRenderer::default(),
            custom: GroupRenderer::default(),
        }
    }

    /// Parameter groups owned by the portal itself (device name, portal
    /// password and the like).
    pub fn with_system_groups(mut self, groups: Vec<ParameterGroup>) -> Self {
        self.system = GroupRenderer::new(groups);
        self
    }

    /// Parameter groups contributed by the embedding application.
    pub fn with_custom_groups(mut self, groups: Vec<ParameterGroup>) -> Self {
        self.custom = GroupRenderer::new(groups);
        self
    }

    /// Version string shown in the page footer; hidden when empty.
    pub fn with_config_version(mut self, version: &str) -> Self {
        self.config_version = version.to_string();
        self
    }

    /// Enable the firmware-update link pointing at `path`.
    pub fn with_update_path(mut self, path: &str) -> Self {
        self.update_path = Some(path.to_string());
        self
    }
}

impl<P: HtmlFormatProvider> PageSource for PortalPage<P> {
    fn static_fragment(&self, step: SectionStep) -> String {
        match step {
            SectionStep::Head => self
                .provider
                .head()
                .replace("{v}", &escape_html(&self.title)),
            SectionStep::Script => self.provider.script().to_string(),
            SectionStep::Style => self.provider.style().to_string(),
            SectionStep::HeadExtension => self.provider.head_extension().to_string(),
            SectionStep::HeadEnd => self.provider.head_end().to_string(),
            SectionStep::FormStart => self.provider.form_start().to_string(),
            SectionStep::FormEnd => self.provider.form_end().to_string(),
            SectionStep::UpdateLink => match &self.update_path {
                Some(path) => self.provider.update_link(path),
                None => String::new(),
            },
            SectionStep::ConfigVersion => {
                if self.config_version.is_empty() {
                    String::new()
                } else {
                    self.provider.config_version(&self.config_version)
                }
            }
            SectionStep::End => self.provider.end().to_string(),
            SectionStep::SystemParams | SectionStep::CustomParams | SectionStep::Done => {
                String::new()
            }
        }
    }

    fn renderer_mut(&mut self, step: SectionStep) -> Option<&mut dyn SectionRenderer> {
        match step {
            SectionStep::SystemParams => Some(&mut self.system),
            SectionStep::CustomParams => Some(&mut self.custom),
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.system.reset();
        self.custom.reset();
    }
}
