use anyhow::{anyhow, Result};
use fantoccini::{Client, Locator};
pub use fantoccini::elements::Element;
use serde_json::Value;
use tracing::debug;

/// Page handle over a live browser session. Cheap to clone.
#[derive(Clone)]
pub struct SkimPage {
    pub(crate) client: Client,
}

/// Node test matching the elements sites use as tabs.
const TAB_NODES: &str = "*[self::a or self::span or self::button]";

/// XPath for `node` elements whose trimmed text is exactly `text`.
pub fn text_xpath(node: &str, text: &str) -> String {
    if text.contains('\'') {
        format!("//{node}[normalize-space(text())=\"{text}\"]")
    } else {
        format!("//{node}[normalize-space(text())='{text}']")
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
}

impl SkimPage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Navigate to `url`.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.client.goto(url).await.map_err(anyhow::Error::from)
    }

    /// Return the full page HTML source.
    pub async fn get_content(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    /// Return the current page URL.
    pub async fn get_url(&self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(anyhow::Error::from)
    }

    async fn eval_u64(&self, script: &str) -> Result<u64> {
        let value = self.client.execute(script, vec![]).await?;
        as_u64(&value).ok_or_else(|| anyhow!("script `{script}` returned non-numeric {value}"))
    }

    pub async fn viewport_height(&self) -> Result<u64> {
        self.eval_u64("return window.innerHeight").await
    }

    pub async fn scroll_offset(&self) -> Result<u64> {
        self.eval_u64("return window.pageYOffset").await
    }

    pub async fn document_height(&self) -> Result<u64> {
        self.eval_u64("return document.documentElement.scrollHeight")
            .await
    }

    pub async fn scroll_to(&self, y: u64) -> Result<()> {
        self.client
            .execute(&format!("window.scrollTo(0, {y});"), vec![])
            .await?;
        Ok(())
    }

    pub async fn scroll_to_bottom(&self) -> Result<()> {
        self.client
            .execute("window.scrollTo(0, document.body.scrollHeight);", vec![])
            .await?;
        Ok(())
    }

    async fn first_usable(&self, xpath: &str) -> Result<Option<Element>> {
        let candidates = self.client.find_all(Locator::XPath(xpath)).await?;
        for el in candidates {
            if el.is_displayed().await? && el.is_enabled().await? {
                return Ok(Some(el));
            }
        }
        debug!(target: "skim.page", %xpath, "no usable element");
        Ok(None)
    }

    /// First visible, enabled anchor whose text is exactly `text`.
    pub async fn find_link_by_text(&self, text: &str) -> Result<Option<Element>> {
        self.first_usable(&text_xpath("a", text)).await
    }

    /// First visible, enabled tab-like element (anchor, span or button)
    /// whose text is exactly `text`.
    pub async fn find_tab_by_text(&self, text: &str) -> Result<Option<Element>> {
        self.first_usable(&text_xpath(TAB_NODES, text)).await
    }

    /// Click through a script, bypassing overlays that swallow native clicks.
    pub async fn click_scripted(&self, element: &Element) -> Result<()> {
        let arg = serde_json::to_value(element)?;
        self.client
            .execute("arguments[0].click();", vec![arg])
            .await?;
        Ok(())
    }

    pub async fn click_native(&self, element: &Element) -> Result<()> {
        element.click().await.map_err(anyhow::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn xpath_quotes_text() {
        assert_eq!(text_xpath("a", "3"), "//a[normalize-space(text())='3']");
        assert_eq!(
            text_xpath("a", "Reader's pick"),
            "//a[normalize-space(text())=\"Reader's pick\"]"
        );
        assert_eq!(
            text_xpath(TAB_NODES, "Articles"),
            "//*[self::a or self::span or self::button][normalize-space(text())='Articles']"
        );
    }

    #[test]
    fn numeric_script_results() {
        assert_eq!(as_u64(&json!(900)), Some(900));
        assert_eq!(as_u64(&json!(812.6)), Some(813));
        assert_eq!(as_u64(&json!(-1.0)), None);
        assert_eq!(as_u64(&json!("900")), None);
    }
}
