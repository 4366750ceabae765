//-
// Copyright (c) 2025, 2026, the Airsync authors
//
// This file is part of Airsync.
//
// Airsync is free software: you can redistribute it and/or modify it under
// the terms of  the GNU General Public  License as published by  the Free
// Software Foundation, either version 3 of the License, or (at your option)
// any later version.
//
// Airsync is distributed  in the hope that  it will be useful,  but WITHOUT
// ANY WARRANTY; without even  the implied warranty of  MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for
// more details.
//
// You should have received a copy of the GNU General Public License along
// with Airsync. If not, see <http://www.gnu.org/licenses/>.

use std::fmt;
use std::sync::{Arc, Mutex};

/// Tracks text that should be included at the start of every log statement.
///
/// Clones of a `LogPrefix` share the same underlying data, so a component
/// holding a clone picks up the principal and device id as soon as the
/// embedding front end resolves them.
#[derive(Clone)]
pub struct LogPrefix {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Clone)]
struct Inner {
    protocol: String,
    principal: Option<String>,
    device_id: Option<String>,
}

impl LogPrefix {
    pub fn new(protocol: String) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                protocol,
                principal: None,
                device_id: None,
            })),
        }
    }

    pub fn deep_clone(&self) -> Self {
        let inner = self.inner.lock().unwrap();
        Self {
            inner: Arc::new(Mutex::new(Inner::clone(&inner))),
        }
    }

    pub fn set_principal(&self, principal: String) {
        self.inner.lock().unwrap().principal = Some(sanitise(principal));
    }

    pub fn set_device_id(&self, device_id: String) {
        self.inner.lock().unwrap().device_id = Some(sanitise(device_id));
    }
}

impl fmt::Display for LogPrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inner = self.inner.lock().unwrap();
        write!(f, "{}", inner.protocol)?;
        if inner.principal.is_some() || inner.device_id.is_some() {
            write!(f, "[")?;
            if let Some(ref principal) = inner.principal {
                write!(f, "{}", principal)?;
            }
            if let Some(ref device_id) = inner.device_id {
                if inner.principal.is_some() {
                    write!(f, " ")?;
                }
                write!(f, "dev={}", device_id)?;
            }
            write!(f, "]")?;
        }

        Ok(())
    }
}

// Principal and device id are client-controlled; keep them from smuggling
// control characters or unbounded garbage into the logs.
fn sanitise(mut s: String) -> String {
    s.retain(|c| !c.is_control());
    if let Some((truncate_len, _)) = s.char_indices().nth(64) {
        s.truncate(truncate_len);
    }

    s
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn formats_protocol_and_identity() {
        let prefix = LogPrefix::new("eas".to_owned());
        assert_eq!("eas", prefix.to_string());

        prefix.set_principal("ahmed".to_owned());
        assert_eq!("eas[ahmed]", prefix.to_string());

        prefix.set_device_id("droid42".to_owned());
        assert_eq!("eas[ahmed dev=droid42]", prefix.to_string());
    }

    #[test]
    fn sanitises_control_characters() {
        let prefix = LogPrefix::new("eas".to_owned());
        prefix.set_principal("a\r\nb".to_owned());
        assert_eq!("eas[ab]", prefix.to_string());
    }
}
