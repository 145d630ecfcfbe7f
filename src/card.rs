use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::error::{QRError, QRResult};
use crate::token::Token;

// Barcode format
//------------------------------------------------------------------------------

// Numeric codes are shared with the watch app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "FormatCode", into = "u8")]
pub enum BarcodeFormat {
    Code128 = 0,
    Code39 = 1,
    EAN13 = 2,
    QR = 3,
    Aztec = 4,
    PDF417 = 5,
}

impl TryFrom<u8> for BarcodeFormat {
    type Error = QRError;
    fn try_from(code: u8) -> QRResult<Self> {
        match code {
            0 => Ok(Self::Code128),
            1 => Ok(Self::Code39),
            2 => Ok(Self::EAN13),
            3 => Ok(Self::QR),
            4 => Ok(Self::Aztec),
            5 => Ok(Self::PDF417),
            _ => Err(QRError::InvalidBarcodeFormat(code)),
        }
    }
}

// Configuration pages may send the code as a number or as a digit string
#[derive(Deserialize)]
#[serde(untagged)]
enum FormatCode {
    Code(u8),
    Text(String),
}

impl TryFrom<FormatCode> for BarcodeFormat {
    type Error = QRError;
    fn try_from(code: FormatCode) -> QRResult<Self> {
        match code {
            FormatCode::Code(c) => Self::try_from(c),
            FormatCode::Text(s) => {
                let c = s.trim().parse::<u8>().map_err(|_| QRError::MalformedBarcodeFormat)?;
                Self::try_from(c)
            }
        }
    }
}

impl From<BarcodeFormat> for u8 {
    fn from(format: BarcodeFormat) -> Self {
        format as u8
    }
}

// Card
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    // Either raw text or a pre-rendered token
    #[serde(default)]
    pub data: String,
    // Original text, used when data is empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub format: BarcodeFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderPolicy {
    // Minimum data length in bytes worth pre-rendering
    pub threshold: usize,
}

impl Default for RenderPolicy {
    fn default() -> Self {
        Self { threshold: 1 }
    }
}

impl Card {
    pub fn new(name: &str, data: &str, format: BarcodeFormat) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            data: data.to_string(),
            text: None,
            format,
        }
    }

    pub fn source(&self) -> &str {
        match (&*self.data, &self.text) {
            ("", Some(text)) => text.as_str(),
            (data, _) => data,
        }
    }

    pub fn token(&self) -> Option<Token> {
        self.source().parse().ok()
    }

    // Replaces QR card data with its token. Data that can't fit any symbol stays raw.
    pub fn prerender(&mut self, policy: &RenderPolicy) -> bool {
        if self.format != BarcodeFormat::QR || self.token().is_some() {
            return false;
        }
        let src = self.source();
        if src.len() < policy.threshold {
            return false;
        }

        match crate::generate(src.as_bytes()) {
            Ok(token) => {
                debug!("Pre-rendered card {:?}: {} bytes", self.name, src.len());
                self.data = token;
                true
            }
            Err(QRError::DataTooLong) => {
                warn!("Card {:?} too long for a symbol, sending raw data", self.name);
                false
            }
            Err(e) => {
                warn!("Card {:?} failed to render: {e}", self.name);
                false
            }
        }
    }
}

pub fn prerender_all(cards: &mut [Card], policy: &RenderPolicy) -> usize {
    cards.iter_mut().map(|c| c.prerender(policy)).filter(|&r| r).count()
}

#[cfg(test)]
mod card_tests {
    use test_case::test_case;

    use super::{prerender_all, BarcodeFormat, Card, FormatCode, RenderPolicy};
    use crate::common::error::QRError;
    use crate::reader::decode;

    #[test_case(0, BarcodeFormat::Code128)]
    #[test_case(2, BarcodeFormat::EAN13)]
    #[test_case(3, BarcodeFormat::QR)]
    #[test_case(5, BarcodeFormat::PDF417)]
    fn test_format_codes(code: u8, format: BarcodeFormat) {
        assert_eq!(BarcodeFormat::try_from(code), Ok(format));
        assert_eq!(u8::from(format), code);
    }

    #[test]
    fn test_format_code_invalid() {
        assert_eq!(BarcodeFormat::try_from(6), Err(QRError::InvalidBarcodeFormat(6)));
        let text = FormatCode::Text("EAN".to_string());
        assert_eq!(BarcodeFormat::try_from(text), Err(QRError::MalformedBarcodeFormat));
    }

    #[test]
    fn test_prerender_qr() {
        let mut card = Card::new("Gym", "MEMBER-0042", BarcodeFormat::QR);
        assert!(card.prerender(&RenderPolicy::default()));
        let token = card.token().unwrap();
        assert_eq!(token.width(), 21);
        assert_eq!(decode(&token).unwrap(), b"MEMBER-0042");

        // Already a token
        let before = card.clone();
        assert!(!card.prerender(&RenderPolicy::default()));
        assert_eq!(card, before);
    }

    #[test]
    fn test_prerender_below_threshold() {
        let mut card = Card::new("Locker", "17", BarcodeFormat::QR);
        assert!(!card.prerender(&RenderPolicy { threshold: 3 }));
        assert_eq!(card.data, "17");
    }

    #[test]
    fn test_prerender_other_format() {
        let mut card = Card::new("Library", "1234567890128", BarcodeFormat::EAN13);
        assert!(!card.prerender(&RenderPolicy::default()));
        assert_eq!(card.data, "1234567890128");
    }

    #[test]
    fn test_prerender_too_long() {
        let data = "x".repeat(272);
        let mut card = Card::new("Ticket", &data, BarcodeFormat::QR);
        assert!(!card.prerender(&RenderPolicy::default()));
        assert_eq!(card.data, data);
    }

    #[test]
    fn test_prerender_text_fallback() {
        let mut card = Card::new("Coffee", "", BarcodeFormat::QR);
        card.text = Some("LOYALTY-9".to_string());
        assert!(card.prerender(&RenderPolicy::default()));
        assert_eq!(decode(&card.token().unwrap()).unwrap(), b"LOYALTY-9");
    }

    #[test]
    fn test_prerender_all() {
        let mut cards = vec![
            Card::new("A", "alpha", BarcodeFormat::QR),
            Card::new("B", "bravo", BarcodeFormat::Code39),
            Card::new("C", "charlie", BarcodeFormat::QR),
        ];
        assert_eq!(prerender_all(&mut cards, &RenderPolicy::default()), 2);
        assert!(cards[0].token().is_some());
        assert!(cards[1].token().is_none());
    }

    #[test]
    fn test_json() {
        let json = r#"[
            {"name": "Gym", "description": "Member", "data": "12345", "format": 3},
            {"name": "Bus", "data": "3,3,B28", "format": 4}
        ]"#;
        let cards: Vec<Card> = serde_json::from_str(json).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].format, BarcodeFormat::QR);
        assert_eq!(cards[0].description, "Member");
        assert_eq!(cards[1].description, "");
        assert_eq!(cards[1].token().unwrap().to_bytes(), [0b10110010, 0b10000000]);

        let out = serde_json::to_value(&cards[0]).unwrap();
        assert_eq!(out["format"], 3);
        assert!(out.get("text").is_none());

        let bad = r#"{"name": "X", "data": "1", "format": 9}"#;
        assert!(serde_json::from_str::<Card>(bad).is_err());
    }

    #[test]
    fn test_json_lenient_fields() {
        let json = r#"[
            {"data": "12345", "format": "3"},
            {"name": "Bus", "data": "1", "format": " 4 "}
        ]"#;
        let cards: Vec<Card> = serde_json::from_str(json).unwrap();
        assert_eq!(cards[0].name, "");
        assert_eq!(cards[0].format, BarcodeFormat::QR);
        assert_eq!(cards[1].format, BarcodeFormat::Aztec);

        // Written back as a number
        assert_eq!(serde_json::to_value(&cards[0]).unwrap()["format"], 3);

        for bad in [r#"{"data": "1", "format": "qr"}"#, r#"{"data": "1", "format": "9"}"#] {
            assert!(serde_json::from_str::<Card>(bad).is_err(), "{bad} should be rejected");
        }
    }
}

// Sync messages
//------------------------------------------------------------------------------

// Watch side fields hold 32 bytes including the terminator
pub const MAX_FIELD_LEN: usize = 31;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum SyncMessage {
    Start,
    Card {
        index: usize,
        name: String,
        description: String,
        format: u8,
        // Zero for raw data
        width: usize,
        height: usize,
        data: Vec<u8>,
    },
    Complete,
}

impl SyncMessage {
    fn from_card(index: usize, card: &Card) -> Self {
        let (width, height, data) = match card.token() {
            Some(token) => (token.width(), token.height(), token.to_bytes()),
            None => (0, 0, card.source().as_bytes().to_vec()),
        };
        debug!("Card {index}: {:?} ({width}x{height}, {} bytes)", card.name, data.len());
        Self::Card {
            index,
            name: truncate_field(&card.name),
            description: truncate_field(&card.description),
            format: card.format.into(),
            width,
            height,
            data,
        }
    }
}

pub fn sync_messages(cards: &[Card]) -> Vec<SyncMessage> {
    let mut msgs = Vec::with_capacity(cards.len() + 2);
    msgs.push(SyncMessage::Start);
    msgs.extend(cards.iter().enumerate().map(|(i, c)| SyncMessage::from_card(i, c)));
    msgs.push(SyncMessage::Complete);
    msgs
}

fn truncate_field(s: &str) -> String {
    let mut end = s.len().min(MAX_FIELD_LEN);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
