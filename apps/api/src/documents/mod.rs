// Inputs to the analysis tasks: PDF text extraction and profile scraping.
// Both are external collaborators with fixed interfaces; the handlers only see
// the traits.

pub mod extractor;
pub mod scraper;

pub use extractor::{DocumentTextExtractor, PdfTextExtractor};
pub use scraper::{HttpProfileScraper, ProfileScraper, ScrapedProfile};
