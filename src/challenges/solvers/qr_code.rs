//! Defaced QR code puzzle.
//!
//! The challenge page embeds a base64 PNG of a QR code whose three finder
//! patterns have been scribbled over. The solver redraws the markers, decodes
//! the symbol, and posts back the last path segment of the decoded text.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use image::RgbaImage;
use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::challenges::core::{
    ChallengeHttpClient, ChallengeRequest, CookieJar, FinderLayout, capture_token,
    execute_request, payload_text, repair_finder_patterns,
};
use crate::external_deps::barcode::{BarcodeDecoder, DecodeError};

use super::{Puzzle, PuzzleError};

static IMAGE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"base64,([^"]+)"#).unwrap());

/// Form field carrying the answer.
pub const ANSWER_FIELD: &str = "metu";

#[derive(Clone, PartialEq)]
pub struct QrChallenge {
    pub image: RgbaImage,
}

impl std::fmt::Debug for QrChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (width, height) = self.image.dimensions();
        f.debug_struct("QrChallenge")
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrSolution {
    pub decoded: String,
    pub key: String,
}

/// Pull the embedded PNG out of the challenge page.
pub fn parse_qr_page(payload: &[u8]) -> Result<QrChallenge, PuzzleError> {
    let text = payload_text(payload)?;
    let encoded = capture_token(&IMAGE_RE, text, "base64 image")?;
    let png = STANDARD.decode(encoded).map_err(DecodeError::from)?;
    let image = image::load_from_memory(&png)
        .map_err(DecodeError::from)?
        .to_rgba8();
    Ok(QrChallenge { image })
}

/// Strip everything up to and including the last `/`.
pub fn extract_key(decoded: &str) -> &str {
    decoded
        .rsplit_once('/')
        .map_or(decoded, |(_, key)| key)
}

/// Repair, decode, and extract the key.
pub fn solve_qr(
    challenge: &QrChallenge,
    layout: &FinderLayout,
    decoder: &dyn BarcodeDecoder,
) -> Result<QrSolution, DecodeError> {
    let repaired = repair_finder_patterns(&challenge.image, layout);
    let decoded = decoder.decode(&repaired)?;
    log::debug!("{} decoded {:?}", decoder.name(), decoded);
    let key = extract_key(&decoded).to_string();
    Ok(QrSolution { decoded, key })
}

/// HTTP puzzle: GET the page, POST `metu=<key>` to the same URL.
pub struct QrCodePuzzle {
    client: Arc<dyn ChallengeHttpClient>,
    decoder: Arc<dyn BarcodeDecoder>,
    challenge_url: Url,
    layout: FinderLayout,
}

impl QrCodePuzzle {
    pub fn new(
        client: Arc<dyn ChallengeHttpClient>,
        decoder: Arc<dyn BarcodeDecoder>,
        challenge_url: Url,
    ) -> Self {
        Self {
            client,
            decoder,
            challenge_url,
            layout: FinderLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: FinderLayout) -> Self {
        self.layout = layout;
        self
    }
}

#[async_trait]
impl Puzzle for QrCodePuzzle {
    type Session = CookieJar;
    type Challenge = QrChallenge;
    type Solution = QrSolution;

    fn name(&self) -> &'static str {
        "qr-code"
    }

    async fn open(&self) -> Result<CookieJar, PuzzleError> {
        Ok(CookieJar::new())
    }

    async fn fetch(&self, session: &mut CookieJar) -> Result<Bytes, PuzzleError> {
        let request = ChallengeRequest::get(self.challenge_url.clone());
        let response = execute_request(self.client.as_ref(), session, request).await?;
        Ok(response.body)
    }

    fn parse(&self, payload: &[u8]) -> Result<QrChallenge, PuzzleError> {
        parse_qr_page(payload)
    }

    fn solve(&self, challenge: &QrChallenge) -> Result<QrSolution, PuzzleError> {
        Ok(solve_qr(challenge, &self.layout, self.decoder.as_ref())?)
    }

    async fn submit(
        &self,
        session: &mut CookieJar,
        solution: &QrSolution,
    ) -> Result<Option<Bytes>, PuzzleError> {
        let request = ChallengeRequest::post_form(
            self.challenge_url.clone(),
            vec![(ANSWER_FIELD.to_string(), solution.key.clone())],
        );
        let response = execute_request(self.client.as_ref(), session, request).await?;
        Ok(Some(response.body))
    }
}
