//! Subscription requests collected by a front-end.
//!
//! A request pairs a subscriber name with a category, written as `NAME=CATEGORY`
//! on the command line or one per line in a subscribers file.

use std::io::BufRead;
use std::str::FromStr;

use crate::category::Category;
use crate::error::QuoteError;
use crate::observer::QuoteObserver;
use crate::sink::QuoteSink;

/// Trait providing file parsing for subscription requests.
pub trait SubscriptionParser: Sized {
    /// Parses requests from a buffered reader.
    ///
    /// Each non-empty line not starting with `#` is parsed with `FromStr`.
    /// Returns an error if any line cannot be parsed.
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, QuoteError>;
}

/// One subscriber asking for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionRequest {
    /// Subscriber name shown next to the values.
    pub subscriber: String,
    /// Requested category.
    pub category: Category,
}

impl SubscriptionRequest {
    /// Build the observer for this request, presenting through `sink`.
    pub fn into_observer(self, sink: Box<dyn QuoteSink>) -> QuoteObserver {
        QuoteObserver::new(self.subscriber, self.category, sink)
    }
}

impl FromStr for SubscriptionRequest {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, category) = s
            .split_once('=')
            .ok_or_else(|| QuoteError::InvalidSubscription(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(QuoteError::InvalidSubscription(s.to_string()));
        }
        let category = category
            .trim()
            .parse::<Category>()
            .map_err(|_| QuoteError::InvalidSubscription(s.to_string()))?;
        Ok(Self {
            subscriber: name.to_string(),
            category,
        })
    }
}

impl SubscriptionParser for SubscriptionRequest {
    fn parse_from_file<R: BufRead>(reader: R) -> Result<Vec<Self>, QuoteError> {
        let mut requests = Vec::new();

        for line_result in reader.lines() {
            let line = line_result.map_err(QuoteError::Io)?;
            let trimmed_line = line.trim();
            if trimmed_line.is_empty() || trimmed_line.starts_with('#') {
                continue;
            }
            requests.push(trimmed_line.parse::<Self>()?);
        }
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_name_and_category() {
        let req: SubscriptionRequest = " ana = Forex ".parse().unwrap();
        assert_eq!(req.subscriber, "ana");
        assert_eq!(req.category, Category::Forex);
    }

    #[test]
    fn rejects_malformed_requests() {
        assert!(matches!("ana".parse::<SubscriptionRequest>(), Err(QuoteError::InvalidSubscription(_))));
        assert!("=forex".parse::<SubscriptionRequest>().is_err());
        assert!("ana=bonds".parse::<SubscriptionRequest>().is_err());
    }

    #[test]
    fn parses_file_skipping_blanks_and_comments() {
        let text = "# subscribers\nana=forex\n\nluis=stocks\nmarta=commodities\n";
        let requests = SubscriptionRequest::parse_from_file(Cursor::new(text)).unwrap();
        let categories: Vec<Category> = requests.iter().map(|r| r.category).collect();
        assert_eq!(categories, vec![Category::Forex, Category::Equity, Category::Commodity]);
    }

    #[test]
    fn file_with_bad_line_fails() {
        let text = "ana=forex\nnonsense\n";
        assert!(SubscriptionRequest::parse_from_file(Cursor::new(text)).is_err());
    }
}
