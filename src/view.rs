use crate::array::DenseArray;
use crate::error::{Error, Result};
use crate::record::{Attribute, Record};
use crate::select::Selector;
use crate::series::SortedSeries;




/**
 * Reads one named attribute across every record of a series, stacking the
 * values into a single array with a leading record axis. Suited to fields
 * and meshes, which have the same shape in every record.
 */
pub struct ArrayView<'a, T> {
    series: &'a SortedSeries<T>,
}




/**
 * Reads one named attribute across every record of a series as a column of
 * borrowed values, which need not share a shape or type.
 */
pub struct SingleView<'a, T> {
    series: &'a SortedSeries<T>,
}




#[derive(Clone, Debug, PartialEq)]


/**
 * The values of one attribute, paired with the keys of the records they
 * came from, in key order.
 */
pub struct Column<'a> {
    entries: Vec<(f64, Attribute<'a>)>,
}




// ============================================================================
impl<T: Record> SortedSeries<T> {

    pub fn as_array(&self) -> ArrayView<'_, T> {
        ArrayView { series: self }
    }

    pub fn as_single(&self) -> SingleView<'_, T> {
        SingleView { series: self }
    }
}




// ============================================================================
impl<'a, T: Record> ArrayView<'a, T> {

    pub fn series(&self) -> &'a SortedSeries<T> {
        self.series
    }


    /**
     * Stack the named attribute of every record. Fails if a record lacks
     * the attribute, if it is not numeric, or if shapes differ between
     * records.
     */
    pub fn get(&self, name: &str) -> Result<DenseArray> {
        let arrays = self
            .series
            .iter()
            .map(|record| {
                record
                    .attribute(name)
                    .ok_or_else(|| Error::UnknownAttribute(name.to_string()))?
                    .to_dense()
                    .ok_or_else(|| Error::NotNumeric(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        DenseArray::stack(name, arrays)
    }

    pub fn get_many(&self, names: &[&str]) -> Result<Vec<DenseArray>> {
        names.iter().map(|name| self.get(name)).collect()
    }


    /**
     * Index the underlying series by position, key, or range.
     */
    pub fn select<S: Into<Selector>>(&self, selector: S) -> Result<SortedSeries<&'a T>> {
        self.series.select(selector)
    }
}




// ============================================================================
impl<'a, T: Record> SingleView<'a, T> {

    pub fn series(&self) -> &'a SortedSeries<T> {
        self.series
    }

    pub fn get(&self, name: &str) -> Result<Column<'a>> {
        let entries = self
            .series
            .iter()
            .map(|record| {
                let value = record.attribute(name).ok_or_else(|| Error::UnknownAttribute(name.to_string()))?;
                Ok((record.key(), value))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Column { entries })
    }

    pub fn get_many(&self, names: &[&str]) -> Result<Vec<Column<'a>>> {
        names.iter().map(|name| self.get(name)).collect()
    }

    pub fn select<S: Into<Selector>>(&self, selector: S) -> Result<SortedSeries<&'a T>> {
        self.series.select(selector)
    }
}




// ============================================================================
impl<'a> Column<'a> {

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }


    /**
     * Return the value at a position. Negative positions count from the
     * end.
     */
    pub fn at(&self, index: isize) -> Result<&Attribute<'a>> {
        let len = self.entries.len();
        let position = if index < 0 { len as isize + index } else { index };

        if position < 0 || position as usize >= len {
            return Err(Error::IndexOutOfRange { index, len });
        }
        Ok(&self.entries[position as usize].1)
    }

    pub fn at_key(&self, key: f64) -> Result<&Attribute<'a>> {
        self.entries
            .binary_search_by(|(k, _)| k.total_cmp(&key))
            .map(|i| &self.entries[i].1)
            .map_err(|_| Error::KeyNotFound(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Attribute<'a>> + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &Attribute<'a>)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }


    /**
     * Return the values as numbers, failing on the first one that is not.
     */
    pub fn to_f64(&self) -> Result<Vec<f64>> {
        self.values()
            .map(|v| v.as_f64().ok_or_else(|| Error::NotNumeric(v.to_string())))
            .collect()
    }


    /**
     * For a column of tables, return the column of one labeled entry.
     */
    pub fn lookup(&self, label: &str) -> Result<Column<'a>> {
        let entries = self
            .entries
            .iter()
            .map(|(k, v)| {
                let value = v
                    .as_table()
                    .and_then(|t| t.get(label))
                    .ok_or_else(|| Error::UnknownAttribute(label.to_string()))?;
                Ok((*k, Attribute::from(value)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Column { entries })
    }
}
