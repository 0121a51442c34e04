//! Management interface driven by the host application.

use std::str::FromStr;
use std::sync::Arc;

use crate::codec;
use crate::logging::{debug, info};
use crate::session::Session;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(&'static str),

    #[error("Card data is not valid hex text: {0}")]
    MalformedData(#[source] codec::Error),

    #[error("Method not implemented: {0}")]
    NotImplemented(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Capabilities of the device, answered by the host platform.
pub trait Platform {
    /// Whether the device can emulate cards at all.
    fn is_supported(&self) -> bool;

    /// Whether the contactless controller is currently switched on.
    fn is_enabled(&self) -> bool;
}

/// Methods exposed to the host application, by their channel names.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Method {
    IsSupported,
    IsEnabled,
    StartEmulation,
    StopEmulation,
    IsEmulating,
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        use Method::*;

        Ok(match s {
            "isHceSupported" => IsSupported,
            "isHceEnabled" => IsEnabled,
            "startEmulation" => StartEmulation,
            "stopEmulation" => StopEmulation,
            "isEmulating" => IsEmulating,
            _ => return Err(Error::NotImplemented(s.to_string())),
        })
    }
}

/// Arguments of a method call. Only `startEmulation` reads them.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    pub uid: Option<String>,
    pub data: Option<String>,
    pub technology: Option<String>,
}

pub struct Manager<P>
where
    P: Platform,
{
    session: Arc<Session>,
    platform: P,
}

impl<P> Manager<P>
where
    P: Platform,
{
    pub fn new(session: Arc<Session>, platform: P) -> Self {
        Self { session, platform }
    }

    /// Starts emulating a card with the identifier, and the payload in hex text if any.
    /// The technology is accepted for the host's sake but does not change any response.
    pub fn start_emulation(
        &self,
        uid: Option<&str>,
        data: Option<&str>,
        technology: Option<&str>,
    ) -> Result<()> {
        let uid = uid.ok_or(Error::InvalidArguments("UID is required"))?;
        let payload = data
            .map(codec::decode)
            .transpose()
            .map_err(Error::MalformedData)?;

        debug!("Starting emulation for UID: {}, technology: {:?}", uid, technology);

        self.session.start(payload, Some(uid.to_string()));

        info!("Emulation started");
        Ok(())
    }

    pub fn stop_emulation(&self) {
        self.session.stop();
    }

    pub fn is_emulating(&self) -> bool {
        self.session.is_active()
    }

    pub fn is_supported(&self) -> bool {
        self.platform.is_supported()
    }

    pub fn is_enabled(&self) -> bool {
        self.platform.is_enabled()
    }

    /// Dispatches a method call by its name, answering with a boolean as the host channel does.
    pub fn call(&self, method: &str, args: &Arguments) -> Result<bool> {
        Ok(match method.parse::<Method>()? {
            Method::IsSupported => self.is_supported(),
            Method::IsEnabled => self.is_enabled(),
            Method::StartEmulation => {
                self.start_emulation(
                    args.uid.as_deref(),
                    args.data.as_deref(),
                    args.technology.as_deref(),
                )?;
                true
            }
            Method::StopEmulation => {
                self.stop_emulation();
                true
            }
            Method::IsEmulating => self.is_emulating(),
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::EmulationState;

    struct Fixed(bool, bool);

    impl Platform for Fixed {
        fn is_supported(&self) -> bool {
            self.0
        }

        fn is_enabled(&self) -> bool {
            self.1
        }
    }

    fn manager() -> Manager<Fixed> {
        Manager::new(Arc::new(Session::new()), Fixed(true, false))
    }

    #[test]
    fn test_start_emulation() {
        let manager = manager();
        manager
            .start_emulation(Some("04:A2:B3:C4"), Some("DE:AD"), Some("IsoDep"))
            .unwrap();

        assert!(manager.is_emulating());
        assert_eq!(
            EmulationState {
                payload: Some(vec![0xDE, 0xAD]),
                identifier: Some("04:A2:B3:C4".to_string()),
                active: true,
            },
            manager.session().snapshot()
        );

        manager.stop_emulation();
        assert!(!manager.is_emulating());
        assert_eq!(EmulationState::default(), manager.session().snapshot());
    }

    #[test]
    fn test_start_emulation_requires_uid() {
        let manager = manager();

        assert!(matches!(
            manager.start_emulation(None, Some("DEAD"), None),
            Err(Error::InvalidArguments(_))
        ));
        assert!(!manager.is_emulating());
    }

    #[test]
    fn test_start_emulation_rejects_malformed_data() {
        let manager = manager();

        assert!(matches!(
            manager.start_emulation(Some("04"), Some("DEA"), None),
            Err(Error::MalformedData(_))
        ));
        assert!(!manager.is_emulating());
    }

    #[test]
    fn test_call() {
        let manager = manager();
        let args = Arguments {
            uid: Some("04A2".to_string()),
            ..Default::default()
        };

        assert!(manager.call("isHceSupported", &args).unwrap());
        assert!(!manager.call("isHceEnabled", &args).unwrap());
        assert!(!manager.call("isEmulating", &args).unwrap());
        assert!(manager.call("startEmulation", &args).unwrap());
        assert!(manager.call("isEmulating", &args).unwrap());
        assert_eq!(None, manager.session().snapshot().payload);
        assert!(manager.call("stopEmulation", &args).unwrap());
        assert!(!manager.call("isEmulating", &args).unwrap());
    }

    #[test]
    fn test_call_unknown_method() {
        assert!(matches!(
            manager().call("readTag", &Arguments::default()),
            Err(Error::NotImplemented(m)) if m == "readTag"
        ));
        assert!(matches!(
            manager().call("startEmulation", &Arguments::default()),
            Err(Error::InvalidArguments(_))
        ));
    }
}
