use regex::{NoExpand, Regex};

use crate::clients::{entities::TrackId, errors::Result};

/// Class carried by the elements that reference a playable track
const PLAY_BUTTON_CLASS: &str = "play-button";
/// Attribute holding the track reference on a play button
const TRACK_REF_ATTR: &str = "m-url";

/// Pattern matching over Mixcloud page markup
pub struct PageScraper {
    preview: Regex,
    stream_segment: Regex,
    span_tag: Regex,
    attribute: Regex,
    hidden: Regex,
}

impl PageScraper {
    pub fn new() -> Result<Self> {
        Ok(PageScraper {
            preview: Regex::new(r#"m-preview="([^"]*)""#)?,
            stream_segment: Regex::new(r"/stream[0-9]{2}/")?,
            // Quoted values may contain '>'
            span_tag: Regex::new(r#"(?is)<span\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#)?,
            attribute: Regex::new(
                r#"(?i)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#,
            )?,
            // Comments and script/style text never hold real elements
            hidden: Regex::new(r"(?is)<!--.*?-->|<(?:script|style)\b.*?</(?:script|style)\s*>")?,
        })
    }

    /// The raw `m-preview` url of a track page, if any
    pub fn extract_preview<'a>(&self, body: &'a str) -> Option<&'a str> {
        self.preview
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Turn a preview url into the full-quality url served by stream server `server`
    pub fn rewrite_stream_url(&self, preview: &str, server: u16) -> String {
        let originals = preview.replace("previews", "c/originals");
        let segment = format!("/stream{server}/");
        self.stream_segment
            .replace_all(&originals, NoExpand(&segment))
            .into_owned()
    }

    /// `m-url` values of every play button on a listing page, in document order
    pub fn track_refs(&self, html: &str) -> Vec<TrackId> {
        let visible = self.hidden.replace_all(html, "");
        self.span_tag
            .captures_iter(&visible)
            .filter_map(|caps| caps.get(1))
            .filter_map(|attrs| self.play_button_ref(attrs.as_str()))
            .map(TrackId::new)
            .collect()
    }

    fn play_button_ref(&self, attrs: &str) -> Option<String> {
        let mut is_play_button = false;
        let mut track_ref = None;
        for caps in self.attribute.captures_iter(attrs) {
            let name = &caps[1];
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            if name.eq_ignore_ascii_case("class") {
                is_play_button = value.split_whitespace().any(|c| c == PLAY_BUTTON_CLASS);
            } else if name.eq_ignore_ascii_case(TRACK_REF_ATTR) && track_ref.is_none() {
                track_ref = Some(decode_entities(value));
            }
        }
        if is_play_button { track_ref } else { None }
    }
}

fn decode_entities(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraper() -> PageScraper {
        PageScraper::new().unwrap()
    }

    #[test]
    fn extracts_preview_verbatim() {
        let body = r#"<div class="cloudcast" m-preview="http://stream8.mixcloud.com/previews/a/b/c.mp3" m-title="x"></div>"#;
        assert_eq!(
            scraper().extract_preview(body),
            Some("http://stream8.mixcloud.com/previews/a/b/c.mp3")
        );
    }

    #[test]
    fn first_preview_wins() {
        let body = r#"m-preview="first" ... m-preview="second""#;
        assert_eq!(scraper().extract_preview(body), Some("first"));
    }

    #[test]
    fn missing_preview_is_none() {
        assert_eq!(scraper().extract_preview("<html><body></body></html>"), None);
        assert_eq!(scraper().extract_preview("m-preview=unquoted"), None);
    }

    #[test]
    fn rewrite_points_at_originals_on_chosen_server() {
        let url = scraper().rewrite_stream_url(
            "http://cdn.example.com/stream05/previews/1/2/3/abc.mp3",
            17,
        );
        assert_eq!(url, "http://cdn.example.com/stream17/c/originals/1/2/3/abc.mp3");
        assert!(!url.contains("previews"));
    }

    #[test]
    fn rewrite_replaces_every_previews_occurrence() {
        let url = scraper().rewrite_stream_url("http://h/stream10/previews/previews.mp3", 13);
        assert!(!url.contains("previews"));
        assert_eq!(url, "http://h/stream13/c/originals/c/originals.mp3");
    }

    #[test]
    fn rewrite_leaves_other_stream_segments_alone() {
        let s = scraper();
        assert_eq!(
            s.rewrite_stream_url("http://h/stream5/previews/a.mp3", 13),
            "http://h/stream5/c/originals/a.mp3"
        );
        assert_eq!(
            s.rewrite_stream_url("http://stream12.h/previews/a.mp3", 13),
            "http://stream12.h/c/originals/a.mp3"
        );
    }

    #[test]
    fn collects_play_button_refs_in_order_with_duplicates() {
        let html = r#"
            <span class="play-button" m-url="/dj/first-mix/"></span>
            <span class="other" m-url="/dj/ignored/"></span>
            <span m-url="/dj/second-mix/" class="btn play-button large"></span>
            <span class="play-button"></span>
            <SPAN CLASS='play-button' M-URL='/dj/first-mix/'></SPAN>
            <div class="play-button" m-url="/dj/not-a-span/"></div>
        "#;
        let refs: Vec<String> = scraper()
            .track_refs(html)
            .into_iter()
            .map(|id| id.to_string())
            .collect();
        assert_eq!(refs, ["/dj/first-mix/", "/dj/second-mix/", "/dj/first-mix/"]);
    }

    #[test]
    fn attribute_values_may_contain_angle_brackets_and_entities() {
        let html = r#"<span title="a > b" class="play-button" m-url="/dj/r&amp;b-mix/"></span>"#;
        let refs = scraper().track_refs(html);
        assert_eq!(refs, [TrackId::new("/dj/r&b-mix/")]);
    }

    #[test]
    fn commented_out_and_script_buttons_are_ignored() {
        let html = r#"
            <!-- <span class="play-button" m-url="/dj/commented/"></span> -->
            <script>
                document.write('<span class="play-button" m-url="/dj/scripted/"></span>');
            </script>
            <span class="play-button" m-url="/dj/real/"></span>
            <!--
              <span class="play-button" m-url="/dj/multiline/"></span>
            -->
            <STYLE>.x { content: '<span class="play-button" m-url="/dj/styled/">'; }</STYLE>
        "#;
        assert_eq!(scraper().track_refs(html), [TrackId::new("/dj/real/")]);
    }

    #[test]
    fn page_without_play_buttons_is_empty() {
        let html = "<html><body><span class=\"title\">Nothing here</span></body></html>";
        assert!(scraper().track_refs(html).is_empty());
        assert!(scraper().track_refs("").is_empty());
    }
}
