#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq)]
pub struct Debug {
    /// Snap every animation to its end on the next frame.
    #[knuffel(child)]
    pub complete_instantly: bool,
}
