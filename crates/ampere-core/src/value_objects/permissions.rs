//! Permission bitsets carried by servers, channels, and roles
//!
//! The wire encodes permissions as raw integers, with server-scoped and
//! channel-scoped sets transmitted as a two-element array pair. No
//! allow/deny resolution is performed here; the bitsets are decoded and
//! carried for the application to inspect.

use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

bitflags! {
    /// Server-scoped permission flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ServerPermissions: u64 {
        const VIEW             = 1 << 0;
        const MANAGE_ROLES     = 1 << 1;
        const MANAGE_CHANNELS  = 1 << 2;
        const MANAGE_SERVER    = 1 << 3;
        const KICK_MEMBERS     = 1 << 4;
        const BAN_MEMBERS      = 1 << 5;
        const CHANGE_NICKNAME  = 1 << 12;
        const MANAGE_NICKNAMES = 1 << 13;
        const CHANGE_AVATAR    = 1 << 14;
        const REMOVE_AVATARS   = 1 << 15;
    }
}

bitflags! {
    /// Channel-scoped permission flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChannelPermissions: u64 {
        const VIEW            = 1 << 0;
        const SEND_MESSAGES   = 1 << 1;
        const MANAGE_MESSAGES = 1 << 2;
        const MANAGE_CHANNEL  = 1 << 3;
        const VOICE_CALL      = 1 << 4;
        const INVITE_OTHERS   = 1 << 5;
        const EMBED_LINKS     = 1 << 6;
        const UPLOAD_FILES    = 1 << 7;
    }
}

bitflags! {
    /// User badge flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct UserBadges: u64 {
        const DEVELOPER              = 1 << 0;
        const TRANSLATOR             = 1 << 1;
        const SUPPORTER              = 1 << 2;
        const RESPONSIBLE_DISCLOSURE = 1 << 3;
        const FOUNDER                = 1 << 4;
        const PLATFORM_MODERATION    = 1 << 5;
        const ACTIVE_SUPPORTER       = 1 << 6;
        const PAW                    = 1 << 7;
        const EARLY_ADOPTER          = 1 << 8;
    }
}

/// A (server, channel) permission pair as transmitted on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionPair(pub ServerPermissions, pub ChannelPermissions);

impl PermissionPair {
    #[inline]
    pub const fn server(&self) -> ServerPermissions {
        self.0
    }

    #[inline]
    pub const fn channel(&self) -> ChannelPermissions {
        self.1
    }
}

macro_rules! integer_bitset {
    ($name:ident, $expecting:literal) => {
        impl From<u64> for $name {
            fn from(bits: u64) -> Self {
                $name::from_bits_truncate(bits)
            }
        }

        impl From<$name> for u64 {
            fn from(flags: $name) -> Self {
                flags.bits()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.bits())
            }
        }

        // The wire carries these as plain JSON numbers
        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_u64(self.bits())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                use serde::de::{self, Visitor};

                struct BitsVisitor;

                impl<'de> Visitor<'de> for BitsVisitor {
                    type Value = $name;

                    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                        formatter.write_str($expecting)
                    }

                    fn visit_u64<E>(self, value: u64) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        Ok($name::from_bits_truncate(value))
                    }

                    fn visit_i64<E>(self, value: i64) -> Result<$name, E>
                    where
                        E: de::Error,
                    {
                        Ok($name::from_bits_truncate(value as u64))
                    }
                }

                deserializer.deserialize_u64(BitsVisitor)
            }
        }
    };
}

integer_bitset!(ServerPermissions, "an integer of server permission bits");
integer_bitset!(ChannelPermissions, "an integer of channel permission bits");
integer_bitset!(UserBadges, "an integer of user badge bits");
