//! Binary persistence of the shell configuration
//!
//! Configuration is stored as postcard-serialized bytes so it can live in a
//! flash page or be sent over the wire.

use super::types::ShellConfig;

/// Upper bound on the encoded size of a [`ShellConfig`]
pub const MAX_ENCODED_LEN: usize = 96;

/// Configuration could not be (de)serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistError {
    /// Output buffer too small
    BufferFull,
    /// Stored bytes are not a valid configuration
    Corrupt,
}

impl core::fmt::Display for PersistError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BufferFull => f.write_str("configuration does not fit the buffer"),
            Self::Corrupt => f.write_str("stored configuration is corrupt"),
        }
    }
}

/// Encode into `buf`, returning the used prefix
pub fn encode<'a>(config: &ShellConfig, buf: &'a mut [u8]) -> Result<&'a mut [u8], PersistError> {
    postcard::to_slice(config, buf).map_err(|_| PersistError::BufferFull)
}

/// Decode a configuration written by [`encode`]
pub fn decode(bytes: &[u8]) -> Result<ShellConfig, PersistError> {
    postcard::from_bytes(bytes).map_err(|_| PersistError::Corrupt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinforge_hal::SampleTime;

    #[test]
    fn test_stored_config_restores() {
        let mut config = ShellConfig::default();
        config.adc_sample_time = SampleTime::Cycles480;
        config.uart_read_max = 64;

        let mut buf = [0u8; MAX_ENCODED_LEN];
        let used = encode(&config, &mut buf).map(|b| b.len()).unwrap();
        assert_eq!(decode(&buf[..used]), Ok(config));
    }

    #[test]
    fn test_small_buffer_rejected() {
        let mut buf = [0u8; 2];
        assert_eq!(
            encode(&ShellConfig::default(), &mut buf).map(|b| b.len()),
            Err(PersistError::BufferFull)
        );
    }

    #[test]
    fn test_truncated_bytes_are_corrupt() {
        let mut buf = [0u8; MAX_ENCODED_LEN];
        let used = encode(&ShellConfig::default(), &mut buf).map(|b| b.len()).unwrap();
        assert_eq!(decode(&buf[..used / 2]), Err(PersistError::Corrupt));
    }
}
