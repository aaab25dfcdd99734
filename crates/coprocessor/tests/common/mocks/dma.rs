use k128cp2_core::core::machine::DmaController;
use mockall::mock;

mock! {
    pub Dma {}
    impl DmaController for Dma {
        fn check_dma(&mut self) -> u64;
    }
}
