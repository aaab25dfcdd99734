/// DMA engine mock.
pub mod dma;
