//! Where the spreadsheet comes from: Google Sheets sharing links and CSV downloads.

use reqwest::StatusCode;
use url::Url;

use crate::error::{ComplendarError, ComplendarResult};

const SHEETS_HOST: &str = "docs.google.com";

/// Turn a Google Sheets sharing link into its CSV export URL.
///
/// `https://docs.google.com/spreadsheets/d/<id>/edit?usp=sharing#gid=123` becomes
/// `https://docs.google.com/spreadsheets/d/<id>/export?format=csv&gid=123`.
pub fn spreadsheet_export_url(link: &str) -> ComplendarResult<Url> {
    let invalid = |why: &str| ComplendarError::InvalidSource(format!("{why}: {link}"));

    let url = Url::parse(link.trim()).map_err(|_| invalid("not a URL"))?;
    if url.host_str() != Some(SHEETS_HOST) {
        return Err(invalid("not a Google Sheets link"));
    }

    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    let id = match segments.as_slice() {
        ["spreadsheets", "d", id, ..] if is_spreadsheet_id(id) => *id,
        _ => return Err(invalid("no spreadsheet id in link")),
    };

    // The sheet tab is in the query (?gid=) or, more often, the fragment (#gid=)
    let gid = url
        .query_pairs()
        .find(|(k, _)| k == "gid")
        .map(|(_, v)| v.into_owned())
        .or_else(|| {
            url.fragment()
                .and_then(|f| f.split('&').find_map(|p| p.strip_prefix("gid=")))
                .map(str::to_string)
        });

    let mut export = Url::parse(&format!("https://{SHEETS_HOST}/spreadsheets/d/{id}/export"))
        .map_err(|_| invalid("bad spreadsheet id"))?;
    {
        let mut query = export.query_pairs_mut();
        query.append_pair("format", "csv");
        if let Some(gid) = gid {
            query.append_pair("gid", &gid);
        }
    }

    Ok(export)
}

/// Where to download CSV from: Google Sheets links go through their export
/// URL, any other `http(s)` URL is used as is.
pub fn csv_url(link: &str) -> ComplendarResult<Url> {
    let url = Url::parse(link.trim())
        .map_err(|_| ComplendarError::InvalidSource(format!("not a URL: {link}")))?;

    match url.scheme() {
        "http" | "https" if url.host_str() == Some(SHEETS_HOST) => spreadsheet_export_url(link),
        "http" | "https" => Ok(url),
        other => Err(ComplendarError::InvalidSource(format!(
            "unsupported scheme '{other}': {link}"
        ))),
    }
}

fn is_spreadsheet_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Download CSV text. Redirects are followed.
pub async fn fetch_csv(url: &Url) -> ComplendarResult<String> {
    tracing::info!(%url, "fetching CSV");

    let response = reqwest::get(url.clone())
        .await
        .map_err(|e| ComplendarError::Fetch(e.to_string()))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ComplendarError::AccessDenied(status.to_string()));
    }
    if !status.is_success() {
        return Err(ComplendarError::Fetch(format!("{url} returned {status}")));
    }

    // A private sheet answers with its sign-in page instead of CSV
    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"));
    if is_html {
        return Err(ComplendarError::AccessDenied("got a web page instead of CSV".into()));
    }

    let text = response
        .text()
        .await
        .map_err(|e| ComplendarError::Fetch(e.to_string()))?;
    tracing::debug!(bytes = text.len(), "downloaded CSV");

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz0123456789-_abcd";

    #[test]
    fn test_sharing_link_to_export_url() {
        let link = format!("https://docs.google.com/spreadsheets/d/{ID}/edit?usp=sharing");
        let url = spreadsheet_export_url(&link).unwrap();
        assert_eq!(
            url.as_str(),
            format!("https://docs.google.com/spreadsheets/d/{ID}/export?format=csv")
        );
    }

    #[test]
    fn test_gid_is_carried_over() {
        let from_fragment = format!("https://docs.google.com/spreadsheets/d/{ID}/edit#gid=42");
        assert!(
            spreadsheet_export_url(&from_fragment)
                .unwrap()
                .as_str()
                .ends_with("export?format=csv&gid=42")
        );

        let from_query = format!("https://docs.google.com/spreadsheets/d/{ID}/edit?gid=7");
        assert!(
            spreadsheet_export_url(&from_query)
                .unwrap()
                .as_str()
                .ends_with("export?format=csv&gid=7")
        );
    }

    #[test]
    fn test_csv_url() {
        let sheet = format!("https://docs.google.com/spreadsheets/d/{ID}/edit");
        assert!(csv_url(&sheet).unwrap().as_str().ends_with("/export?format=csv"));

        let plain = "https://example.com/birthdays.csv";
        assert_eq!(csv_url(plain).unwrap().as_str(), plain);

        assert!(matches!(
            csv_url("ftp://example.com/birthdays.csv"),
            Err(ComplendarError::InvalidSource(_))
        ));
    }

    #[test]
    fn test_rejects_other_links() {
        for link in [
            "not a link",
            "https://example.com/spreadsheets/d/abc/edit",
            "https://docs.google.com/document/d/abc/edit",
            "https://docs.google.com/spreadsheets/d/",
        ] {
            assert!(
                matches!(spreadsheet_export_url(link), Err(ComplendarError::InvalidSource(_))),
                "accepted {link}"
            );
        }
    }
}
