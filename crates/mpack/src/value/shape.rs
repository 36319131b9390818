use crate::{ShapeError, Type, Value};

impl Value {
    /// Checks that `self` is an object holding every listed field with
    /// exactly the listed type. Reports the first field that does not match;
    /// a missing field is found as [`Type::Nil`].
    ///
    /// ```
    /// use mpack::{Type, Value};
    ///
    /// let v = Value::object([("id", Value::from(7u32)), ("name", Value::from("x"))]);
    /// assert!(v.has_shape(&[("id", Type::UInt32), ("name", Type::String)]).is_ok());
    /// assert!(v.has_shape(&[("id", Type::Int64)]).is_err());
    /// ```
    pub fn has_shape(&self, shape: &[(&str, Type)]) -> Result<(), ShapeError> {
        if !self.is_object() {
            return Err(ShapeError::NotAnObject);
        }
        for &(field, expected) in shape {
            let found = self[field].value_type();
            if found != expected {
                return Err(ShapeError::BadType {
                    field: field.to_owned(),
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }
}
