//! Line-oriented signal scripts.
//!
//! ```text
//! # comments and blank lines are ignored
//! connect
//! hmi full
//! audio audible
//! context vr
//! status background not_audible main
//! disconnect
//! ```

use hmiext_core::error::{CoreError, Domain, ErrorKind, Payload, Result};
use hmiext_core::lifecycle::{AudioStreamingState, HmiLevel, Signal, SystemContext};

/// One signal and the script line it came from.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ScriptEntry {
    pub line: usize,
    pub signal: Signal,
}

/// Parse a whole script. Fails on the first malformed line.
pub fn parse_script(text: &str) -> Result<Vec<ScriptEntry>> {
    let mut entries = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        for signal in parse_line(raw).map_err(|e| at_line(e, line))? {
            entries.push(ScriptEntry { line, signal });
        }
    }
    Ok(entries)
}

/// Parse one line into zero (blank/comment), one, or three (`status`) signals.
pub fn parse_line(raw: &str) -> Result<Vec<Signal>> {
    let content = raw.split('#').next().unwrap_or("").trim();
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let lowered = content.to_ascii_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();

    let signals = match words.as_slice() {
        ["connect"] => vec![Signal::Connect],
        ["disconnect"] => vec![Signal::Disconnect],
        ["register"] => vec![Signal::Register],
        ["unregister"] => vec![Signal::Unregister],
        ["hmi", level] => vec![Signal::HmiLevelChanged(hmi_level(level)?)],
        ["audio", audio] => vec![Signal::AudioStreamingChanged(audio_state(audio)?)],
        ["context", ctx] => vec![Signal::SystemContextChanged(system_context(ctx)?)],
        ["status", level, audio, ctx] => vec![
            Signal::HmiLevelChanged(hmi_level(level)?),
            Signal::AudioStreamingChanged(audio_state(audio)?),
            Signal::SystemContextChanged(system_context(ctx)?),
        ],
        _ => return Err(parse_error(format!("unrecognized signal `{content}`"))),
    };

    Ok(signals)
}

fn hmi_level(word: &str) -> Result<HmiLevel> {
    match word {
        "none" => Ok(HmiLevel::None),
        "background" => Ok(HmiLevel::Background),
        "limited" => Ok(HmiLevel::Limited),
        "full" => Ok(HmiLevel::Full),
        other => Err(parse_error(format!("unknown HMI level `{other}`"))),
    }
}

fn audio_state(word: &str) -> Result<AudioStreamingState> {
    match word {
        "audible" => Ok(AudioStreamingState::Audible),
        "attenuated" => Ok(AudioStreamingState::Attenuated),
        "not_audible" | "not-audible" => Ok(AudioStreamingState::NotAudible),
        other => Err(parse_error(format!("unknown audio state `{other}`"))),
    }
}

fn system_context(word: &str) -> Result<SystemContext> {
    match word {
        "main" => Ok(SystemContext::Main),
        "vr" | "voice" => Ok(SystemContext::VoiceRecognition),
        "menu" => Ok(SystemContext::Menu),
        "hmi_obscured" | "obscured" => Ok(SystemContext::HmiObscured),
        "alert" => Ok(SystemContext::Alert),
        other => Err(parse_error(format!("unknown system context `{other}`"))),
    }
}

fn parse_error(message: String) -> CoreError {
    CoreError::warn()
        .domain(Domain::Signal)
        .kind(ErrorKind::Parse)
        .msg(message)
        .build()
}

fn at_line(mut err: CoreError, line: usize) -> CoreError {
    err.message = format!("line {line}: {}", err.message).into();
    err.payload = Payload::Code(u32::try_from(line).unwrap_or(u32::MAX));
    err
}
