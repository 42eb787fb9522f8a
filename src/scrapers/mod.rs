//! Retrieval and field extraction for news article pages.
//!
//! Pages move through this module in a fixed order:
//!
//! 1. **Fetching** ([`fetch`]): download raw markup through the [`Fetch`](fetch::Fetch) seam
//! 2. **Classification** ([`source`]): map the URL to a known publisher
//! 3. **Extraction** ([`extract`]): resolve title, author, date and body by
//!    walking the publisher's locator chains ([`locators`]), then the
//!    universal ones
//!
//! [`index`] discovers article URLs for a given day from a publisher's front
//! page and feeds the batch manifest.
//!
//! # Supported Sources
//!
//! | Source | Host fragment | Index rule |
//! |--------|---------------|------------|
//! | Bloomberg | `bloomberg.co.jp`, `bloomberg.com` | `/news/articles/YYYY-MM-DD/` |
//! | Reuters | `reuters.com` | none |
//! | Nikkei | `nikkei.com` | none |
//! | NHK | `nhk.or.jp` | none |
//! | Yahoo! News | `news.yahoo.co.jp` | none |
//!
//! Any other host is `unknown` and is extracted with the universal chains only.

pub mod extract;
pub mod fetch;
pub mod index;
pub mod locators;
pub mod source;
