//! Enumerated vocabularies.
//!
//! Each enumeration is declared once with its tokens; the macro derives the
//! Rust enum, its [`EnumTable`], and the token conversions from that single
//! list. Aliases are extra raw spellings accepted on read (numeric forms
//! written by early firmware) that map onto a canonical token.

use std::fmt;

/// The legal tokens of one enumeration, in declaration order.
#[derive(Debug, PartialEq, Eq)]
pub struct EnumTable {
    pub name: &'static str,
    pub tokens: &'static [&'static str],
    pub aliases: &'static [(&'static str, &'static str)],
}

impl EnumTable {
    /// The canonical token for `raw`, resolving aliases.
    pub fn canonical(&self, raw: &str) -> Option<&'static str> {
        self.tokens
            .iter()
            .find(|t| **t == raw)
            .or_else(|| self.aliases.iter().find(|(a, _)| *a == raw).map(|(_, t)| t))
            .copied()
    }

    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(&token)
    }
}

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $table:literal {
            $($variant:ident => $token:literal),+ $(,)?
        }
        $(aliases { $($alias:literal => $target:literal),* $(,)? })?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const TABLE: EnumTable = EnumTable {
                name: $table,
                tokens: &[$($token),+],
                aliases: &[$($(($alias, $target)),*)?],
            };

            pub fn as_token(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }

            pub fn from_token(raw: &str) -> Option<Self> {
                match Self::TABLE.canonical(raw)? {
                    $($token => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_token())
            }
        }
    };
}

token_enum! {
    /// Synthesis engine of a sound (`mode`).
    SynthMode, "synth mode" {
        Subtractive => "subtractive",
        Fm => "fm",
        RingMod => "ringmod",
    }
}

token_enum! {
    OscType, "oscillator type" {
        Square => "square",
        Sine => "sine",
        Saw => "saw",
        Triangle => "triangle",
        AnalogSquare => "analogSquare",
        AnalogSaw => "analogSaw",
        Sample => "sample",
    }
}

token_enum! {
    LfoShape, "lfo shape" {
        Square => "square",
        Sine => "sine",
        Saw => "saw",
        Triangle => "triangle",
    }
}

token_enum! {
    ArpeggiatorMode, "arpeggiator mode" {
        Off => "off",
        Up => "up",
        Down => "down",
        Both => "both",
        Random => "random",
    }
}

token_enum! {
    LpfMode, "lpf mode" {
        Ladder24 => "24dB",
        Ladder12 => "12dB",
        Drive24 => "24dBDrive",
    }
}

token_enum! {
    /// Voice allocation (`polyphonic`).
    Polyphony, "polyphony" {
        Auto => "auto",
        Poly => "poly",
        Mono => "mono",
        Legato => "legato",
        Choke => "choke",
    }
    aliases { "0" => "auto", "1" => "poly", "2" => "choke" }
}

token_enum! {
    ModFxType, "mod fx type" {
        None => "none",
        Flanger => "flanger",
        Chorus => "chorus",
        Phaser => "phaser",
    }
}

token_enum! {
    /// Tempo sync division, `0` = off, `1` = four bars ... `10` = 128th.
    SyncLevel, "sync level" {
        Off => "0",
        FourBars => "1",
        TwoBars => "2",
        OneBar => "3",
        Second => "4",
        Fourth => "5",
        Eighth => "6",
        Sixteenth => "7",
        ThirtySecond => "8",
        SixtyFourth => "9",
        OneTwentyEighth => "10",
    }
}

token_enum! {
    VoicePriority, "voice priority" {
        Low => "0",
        Medium => "1",
        High => "2",
    }
}

token_enum! {
    /// Sample playback (`loopMode`).
    SamplePlayMode, "sample play mode" {
        Cut => "0",
        Once => "1",
        Loop => "2",
        Stretch => "3",
    }
}
