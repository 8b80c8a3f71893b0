/// Implementations for gdal
pub mod gdal_backend {
    use std::{fmt::Debug, path::Path, sync::Arc};

    use gdal::{
        raster::{Buffer, GdalType, RasterCreationOptions},
        spatial_ref::SpatialRef,
        Dataset as GdalDataset, DatasetOptions, DriverManager, GdalOpenFlags,
        Metadata as GdalMetadata, MetadataEntry as GdalMetadataEntry,
    };
    use itertools::Itertools;
    use log::debug;
    use num_traits::{Num, NumCast};

    use crate::{
        components::{
            band::{Band, BandReader},
            file::{File, Mode, Profile},
            Metadata,
        },
        env::Env,
        errors::Result,
        path::DatasetPath,
        transform::Transform,
    };

    /// Pixel types the engine can move in and out of buffers.
    pub trait DataType: GdalType + Num + NumCast + Copy + Send + Sync + Debug + 'static {}
    impl<T: GdalType + Num + NumCast + Copy + Send + Sync + Debug + 'static> DataType for T {}

    fn filter_metadata_gdal(metadata: &impl GdalMetadata) -> Metadata {
        GdalMetadata::metadata(metadata)
            .filter_map(|GdalMetadataEntry { domain, key, value }| {
                if domain.eq("") {
                    Some((key, value))
                } else {
                    None
                }
            })
            .collect()
    }

    fn spatial_ref_from(definition: &str) -> Result<SpatialRef> {
        match definition
            .strip_prefix("EPSG:")
            .and_then(|code| code.parse::<u32>().ok())
        {
            Some(code) => Ok(SpatialRef::from_epsg(code)?),
            None => Ok(SpatialRef::from_wkt(definition)?),
        }
    }

    /// Engine-backed dataset handle.
    ///
    /// Keeps the resolved virtual-filesystem path so band readers can
    /// open their own handles.
    #[derive(Debug)]
    pub struct GdalFile {
        vsi: Arc<str>,
        dataset: GdalDataset,
    }

    impl File for GdalFile {
        fn open(path: &DatasetPath, mode: Mode, _env: &Env) -> Result<Self> {
            let vsi: Arc<str> = Arc::from(path.vsi_path());
            let dataset = match mode {
                Mode::Read => GdalDataset::open(Path::new(vsi.as_ref()))?,
                Mode::Update => GdalDataset::open_ex(
                    Path::new(vsi.as_ref()),
                    DatasetOptions {
                        open_flags: GdalOpenFlags::GDAL_OF_UPDATE | GdalOpenFlags::GDAL_OF_RASTER,
                        ..Default::default()
                    },
                )?,
            };
            Ok(GdalFile { vsi, dataset })
        }

        fn create<T: DataType>(path: &DatasetPath, profile: &Profile, _env: &Env) -> Result<Self> {
            let vsi: Arc<str> = Arc::from(path.vsi_path());
            debug!(
                "creating {} ({}x{}x{}, {})",
                vsi,
                profile.count,
                profile.height,
                profile.width,
                profile
                    .options
                    .iter()
                    .map(|(key, value)| format!("{key}={value}"))
                    .join(",")
            );
            let driver = DriverManager::get_driver_by_name(&profile.driver)?;
            let options = RasterCreationOptions::from_iter(
                profile
                    .options
                    .iter()
                    .map(|(key, value)| format!("{key}={value}")),
            );
            let mut dataset = driver.create_with_band_type_with_options::<T, _>(
                Path::new(vsi.as_ref()),
                profile.width,
                profile.height,
                profile.count,
                &options,
            )?;
            if let Some(transform) = &profile.transform {
                dataset.set_geo_transform(&transform.to_gdal())?;
            }
            if let Some(crs) = &profile.crs {
                dataset.set_spatial_ref(&spatial_ref_from(crs)?)?;
            }
            if let Some(nodata) = profile.nodata {
                for index in 1..=profile.count {
                    let mut band = dataset.rasterband(index)?;
                    band.set_no_data_value(Some(nodata))?;
                }
            }
            Ok(GdalFile { vsi, dataset })
        }

        fn description(&self) -> Result<String> {
            Ok(GdalMetadata::description(&self.dataset)?)
        }

        fn driver(&self) -> String {
            self.dataset.driver().short_name()
        }

        fn size(&self) -> (usize, usize) {
            self.dataset.raster_size()
        }

        fn crs(&self) -> String {
            self.dataset.projection()
        }

        fn transform(&self) -> Result<Transform> {
            Ok(Transform::from_gdal(self.dataset.geo_transform()?))
        }

        fn num_bands(&self) -> usize {
            self.dataset.raster_count()
        }

        fn band(&self, index: usize) -> Result<Band> {
            let band = self.dataset.rasterband(index)?;
            let (block_cols, block_rows) = band.block_size();
            Ok(Band {
                index,
                description: band.description()?,
                dtype: format!("{:?}", band.band_type()),
                block_shape: (block_rows, block_cols),
                nodata: band.no_data_value(),
                scale: band.scale(),
                offset: band.offset(),
                metadata: filter_metadata_gdal(&band),
            })
        }

        fn band_reader<T: DataType>(&self, index: usize) -> Result<impl BandReader<T>> {
            Ok(GdalBandReader {
                vsi: Arc::clone(&self.vsi),
                index,
            })
        }

        fn metadata(&self) -> Metadata {
            filter_metadata_gdal(&self.dataset)
        }

        fn write_window<T: DataType>(
            &mut self,
            index: usize,
            offset: (isize, isize),
            shape: (usize, usize),
            data: &[T],
        ) -> Result<()> {
            let (height, width) = shape;
            let mut band = self.dataset.rasterband(index)?;
            let mut buffer = Buffer::new((height, width), data.to_vec());
            band.write(offset, (width, height), &mut buffer)?;
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(self.dataset.flush_cache()?)
        }

        fn close(self) -> Result<()> {
            Ok(self.dataset.close()?)
        }
    }

    /// Opens its own engine handle per read, so reads of independent
    /// windows can run concurrently.
    #[derive(Debug)]
    struct GdalBandReader {
        vsi: Arc<str>,
        index: usize,
    }

    impl<T: DataType> BandReader<T> for GdalBandReader {
        fn read_into_slice(
            &self,
            offset: (isize, isize),
            shape: (usize, usize),
            out_shape: (usize, usize),
            out: &mut [T],
        ) -> Result<()> {
            debug!(
                "band {} of {}: reading {shape:?} at {offset:?} into {out_shape:?}",
                self.index, self.vsi
            );
            let dataset = GdalDataset::open(Path::new(self.vsi.as_ref()))?;
            let band = dataset.rasterband(self.index)?;
            band.read_into_slice::<T>(
                offset,
                (shape.1, shape.0),
                (out_shape.1, out_shape.0),
                out,
                None,
            )?;
            Ok(())
        }
    }
}
