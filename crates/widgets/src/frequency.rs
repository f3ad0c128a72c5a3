use crate::metric::{card, metric_text};
use iced::Element;
use tele_core::Sample;
use tele_theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cluster {
    Little,
    Big,
}

/// Displays the latest scaling frequency of one CPU cluster.
#[derive(Debug)]
pub struct FrequencyWidget {
    cluster: Cluster,
}

impl FrequencyWidget {
    pub fn new(cluster: Cluster) -> Self {
        Self { cluster }
    }

    fn caption(&self) -> &'static str {
        match self.cluster {
            Cluster::Little => "Little Core",
            Cluster::Big    => "Big Core",
        }
    }

    pub fn text(&self, latest: Option<&Sample>) -> String {
        let mhz = latest.map(|s| match self.cluster {
            Cluster::Little => s.freq_little_mhz,
            Cluster::Big    => s.freq_big_mhz,
        });
        metric_text(mhz, "MHz")
    }

    pub fn view<'a, Message: 'a>(&'a self, latest: Option<&Sample>, theme: &Theme) -> Element<'a, Message> {
        card(self.caption(), self.text(latest), theme)
    }
}
