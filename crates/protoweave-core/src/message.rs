//! Property access for messages.
//!
//! The serializer never sees concrete message types. It reads and writes
//! field values through the [`Message`] trait, addressed by the slot index
//! the message's [`MessageDescriptor`] assigns to each field.

use crate::error::{Error, Result};
use crate::schema::MessageDescriptor;
use crate::value::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// Slot-addressed property access used by the serializer
pub trait Message {
    /// Field ordering of this message type
    fn descriptor(&self) -> &MessageDescriptor;

    /// Current value of the property in `slot`
    fn property(&self, slot: usize) -> Result<Cow<'_, Value>>;

    /// Replaces the value of the property in `slot`
    fn set_property(&mut self, slot: usize, value: Value) -> Result<()>;

    /// Moves the value out of `slot` so a decoder can extend it in place.
    ///
    /// The decoder always writes the result back with [`set_property`].
    ///
    /// [`set_property`]: Message::set_property
    fn take_property(&mut self, slot: usize) -> Result<Value> {
        self.property(slot).map(Cow::into_owned)
    }
}

/// A message backed by a descriptor and one [`Value`] per field
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicMessage {
    descriptor: Arc<MessageDescriptor>,
    slots: Vec<Value>,
}

impl DynamicMessage {
    /// Creates a message with every field at its default
    pub fn new(descriptor: Arc<MessageDescriptor>) -> Self {
        let slots = descriptor
            .fields()
            .iter()
            .map(|field| field.kind.default_value())
            .collect();
        Self { descriptor, slots }
    }

    /// Shared handle to the descriptor
    pub fn descriptor_arc(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    /// Value of the field called `name`
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.descriptor
            .slot_named(name)
            .and_then(|slot| self.slots.get(slot))
    }

    /// Mutable value of the field called `name`
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let slot = self.descriptor.slot_named(name)?;
        self.slots.get_mut(slot)
    }

    /// Replaces the field called `name`
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let slot = self
            .descriptor
            .slot_named(name)
            .ok_or_else(|| Error::NoSuchField {
                message: self.descriptor.name().to_owned(),
                name: name.to_owned(),
            })?;
        self.slots[slot] = value.into();
        Ok(())
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    /// Field values in slot order
    pub fn values(&self) -> &[Value] {
        &self.slots
    }

    fn check_slot(&self, slot: usize) -> Result<()> {
        if slot >= self.slots.len() {
            return Err(Error::unknown_property(self.descriptor.name(), slot));
        }
        Ok(())
    }
}

impl Message for DynamicMessage {
    fn descriptor(&self) -> &MessageDescriptor {
        &self.descriptor
    }

    fn property(&self, slot: usize) -> Result<Cow<'_, Value>> {
        self.check_slot(slot)?;
        Ok(Cow::Borrowed(&self.slots[slot]))
    }

    fn set_property(&mut self, slot: usize, value: Value) -> Result<()> {
        self.check_slot(slot)?;
        self.slots[slot] = value;
        Ok(())
    }

    fn take_property(&mut self, slot: usize) -> Result<Value> {
        self.check_slot(slot)?;
        Ok(std::mem::replace(&mut self.slots[slot], Value::Null))
    }
}
