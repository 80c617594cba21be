use kernel::KernelError;

/// Converts backend-specific failures into `KernelError` reports at the
/// driver boundary, keeping the cause chain attached.
pub trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}
