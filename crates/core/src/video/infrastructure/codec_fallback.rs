use thiserror::Error;

/// One encoder initialization attempt: which codec, and the private
/// options passed to `avcodec_open2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CodecCandidate {
    pub name: &'static str,
    pub id: ffmpeg_next::codec::Id,
    pub options: &'static [(&'static str, &'static str)],
}

impl CodecCandidate {
    pub fn dictionary(&self) -> ffmpeg_next::Dictionary<'static> {
        let mut dict = ffmpeg_next::Dictionary::new();
        for (key, value) in self.options {
            dict.set(key, value);
        }
        dict
    }
}

/// H.264 first for playback compatibility, MPEG-4 Part 2 when no H.264
/// encoder is built in.
pub const DEFAULT_CODEC_CHAIN: &[CodecCandidate] = &[
    CodecCandidate {
        name: "h264",
        id: ffmpeg_next::codec::Id::H264,
        options: &[("preset", "medium"), ("crf", "23")],
    },
    CodecCandidate {
        name: "mpeg4",
        id: ffmpeg_next::codec::Id::MPEG4,
        options: &[],
    },
];

#[derive(Error, Debug)]
#[error("no usable video encoder ({})", format_attempts(.attempts))]
pub struct CodecFallbackError {
    /// `(codec name, failure message)` for every candidate tried, in order.
    pub attempts: Vec<(&'static str, String)>,
}

fn format_attempts(attempts: &[(&'static str, String)]) -> String {
    if attempts.is_empty() {
        return "no candidates".to_string();
    }
    attempts
        .iter()
        .map(|(name, msg)| format!("{name}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Runs `attempt` for each candidate in order and returns the first
/// success together with the candidate that produced it.
///
/// Each attempt must clean up after itself on failure; nothing is carried
/// over from one attempt to the next.
pub fn first_successful<T, F>(
    candidates: &[CodecCandidate],
    mut attempt: F,
) -> Result<(CodecCandidate, T), CodecFallbackError>
where
    F: FnMut(&CodecCandidate) -> Result<T, Box<dyn std::error::Error>>,
{
    let mut attempts = Vec::new();
    for candidate in candidates {
        match attempt(candidate) {
            Ok(value) => {
                if !attempts.is_empty() {
                    log::warn!(
                        "Falling back to {} encoder after {} failed attempt(s)",
                        candidate.name,
                        attempts.len()
                    );
                }
                return Ok((*candidate, value));
            }
            Err(e) => {
                log::warn!("Cannot initialize {} encoder: {e}", candidate.name);
                attempts.push((candidate.name, e.to_string()));
            }
        }
    }
    Err(CodecFallbackError { attempts })
}
