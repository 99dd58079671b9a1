//! String-backed cells for fieldless enums.

use std::fmt;
use std::marker::PhantomData;

use prefstore_core::{Error, Result};

use crate::cell::PrefCell;
use crate::state::{MutableState, StateStream};

/// An enum stored by constant name.
///
/// Names are matched exactly and case-sensitively. Use [`pref_enum!`] to
/// derive an implementation for a fieldless enum.
///
/// [`pref_enum!`]: crate::pref_enum
pub trait PrefEnum: Sized + Send + Sync + 'static {
    /// The name persisted for this constant.
    fn name(&self) -> &'static str;

    /// The constant with exactly this name.
    fn from_name(name: &str) -> Option<Self>;

    /// Like [`from_name`](Self::from_name), reporting unknown names as
    /// [`Error::UnknownVariant`].
    fn decode(name: &str) -> Result<Self> {
        Self::from_name(name).ok_or_else(|| Error::UnknownVariant {
            enum_name: short_type_name::<Self>(),
            name: name.to_string(),
        })
    }
}

// `a::Mode<b::Flag>` is reported as `Mode`.
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn decode_name<E: PrefEnum>(name: &String) -> Result<E> {
    E::decode(name)
}

/// Implement [`PrefEnum`] for a fieldless enum using its variant names.
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Theme { Light, Dark, System }
///
/// prefstore_state::pref_enum!(Theme { Light, Dark, System });
/// ```
#[macro_export]
macro_rules! pref_enum {
    ($ty:ty { $($variant:ident),+ $(,)? }) => {
        impl $crate::PrefEnum for $ty {
            fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                }
            }

            fn from_name(name: &str) -> ::std::option::Option<Self> {
                match name {
                    $(stringify!($variant) => ::std::option::Option::Some(Self::$variant),)+
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}

/// A preference cell holding an enum constant, persisted by name.
///
/// Reads decode the cached name. A stored name that matches no constant is
/// reported as [`Error::UnknownVariant`] on every read that sees it, until
/// a valid value is written or the entry is reset.
pub struct EnumCell<E: PrefEnum> {
    raw: PrefCell<String>,
    _enum: PhantomData<fn() -> E>,
}

impl<E: PrefEnum> EnumCell<E> {
    pub(crate) fn new(raw: PrefCell<String>) -> Self {
        Self {
            raw,
            _enum: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        self.raw.name()
    }

    /// Decode the cached name.
    pub fn get(&self) -> Result<E> {
        E::decode(&self.raw.get())
    }

    /// Schedule a write of `value`'s name. Failures are logged and
    /// discarded.
    pub fn set(&self, value: E) {
        self.raw.set(value.name().to_string());
    }

    /// Write `value`'s name and wait for the store to commit it.
    pub async fn write(&self, value: E) -> Result<()> {
        self.raw.write(value.name().to_string()).await
    }

    /// Schedule removal of the entry, returning the cell to its default.
    pub fn reset(&self) {
        self.raw.reset();
    }

    /// Observe the decoded value. Each delivery is decoded separately, so
    /// an unknown name shows up as an `Err` item without ending the stream.
    pub fn subscribe(&self) -> EnumStream<E> {
        StateStream::mapped(self.raw.watch(), decode_name::<E>)
    }

    /// Run `callback` with every decoded value delivered after this call.
    pub fn on_change<F>(&self, mut callback: F)
    where
        F: FnMut(Result<E>) + Send + 'static,
    {
        self.raw.on_change(move |name| callback(E::decode(&name)));
    }

    /// The underlying string cell.
    pub fn raw(&self) -> &PrefCell<String> {
        &self.raw
    }
}

impl<E: PrefEnum> Clone for EnumCell<E> {
    fn clone(&self) -> Self {
        Self::new(self.raw.clone())
    }
}

impl<E: PrefEnum> fmt::Debug for EnumCell<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumCell")
            .field("enum", &short_type_name::<E>())
            .field("raw", &self.raw)
            .finish()
    }
}

impl<E: PrefEnum> MutableState<E, Result<E>> for EnumCell<E> {
    fn get(&self) -> Result<E> {
        EnumCell::get(self)
    }

    fn set(&self, value: E) {
        EnumCell::set(self, value)
    }

    fn subscribe(&self) -> StateStream<Result<E>> {
        EnumCell::subscribe(self)
    }
}

/// Observer of an [`EnumCell`]. The outer `Result` of
/// [`changed`](StateStream::changed) reports a closed cell; the inner one a
/// name that matches no constant.
pub type EnumStream<E> = StateStream<Result<E>>;
