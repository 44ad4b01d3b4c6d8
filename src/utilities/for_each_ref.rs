/// Defines a loop body able to stop the enclosing enumeration early.
pub trait IBreakableForEach<T> {
    /// Executes one execution of the loop body.
    ///
    /// # Arguments
    ///
    /// * `i` - Visited element.
    ///
    /// # Returns
    ///
    /// True if the loop should continue, false otherwise.
    fn loop_body(&mut self, i: T) -> bool;
}

impl<T, F: FnMut(T) -> bool> IBreakableForEach<T> for F {
    #[inline(always)]
    fn loop_body(&mut self, i: T) -> bool {
        self(i)
    }
}
