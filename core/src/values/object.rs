use std::any::Any;
use std::fmt;

/// Callback run on an object's payload when its last handle is released.
pub type Finalizer = Box<dyn FnOnce(&mut dyn Any)>;

/// Opaque payload carried by [`Value::Object`](super::Value::Object).
pub struct NativeObject {
    payload: Box<dyn Any>,
    finalizer: Option<Finalizer>,
}

impl NativeObject {
    pub fn new(payload: Box<dyn Any>, finalizer: Option<Finalizer>) -> Self {
        Self { payload, finalizer }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    pub fn payload(&self) -> &dyn Any {
        self.payload.as_ref()
    }
}

impl Drop for NativeObject {
    fn drop(&mut self) {
        if let Some(finalize) = self.finalizer.take() {
            finalize(self.payload.as_mut());
        }
    }
}

impl fmt::Debug for NativeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<OBJECT:{:p}>", self as *const NativeObject)
    }
}
